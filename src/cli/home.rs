// src/cli/home.rs — Welcome screen

pub const BRAND: &str = "Botify";
pub const TAGLINE: &str = "Experience the next generation of AI conversation. \
Intelligent, responsive, and always ready to help.";

pub fn show_home() {
    println!("{} v{}", BRAND, env!("CARGO_PKG_VERSION"));
    println!();
    println!("{}", TAGLINE);
    println!();
    println!("  botify chat      Start chatting");
    println!("  botify chats     Browse saved chats");
    println!("  botify --help    All commands");
}
