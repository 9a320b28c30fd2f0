//! Startup banner for the REPL playground.

use crate::consts::{HOMEPAGE, REPO};

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub endpoint: &'a str,
    pub model: &'a str,
    pub user: &'a str,
    pub db: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════════╗
   ║             B U R N I S H                 ║
   ║   rough prompts in, polished briefs out   ║
   ╚═══════════════════════════════════════════╝

   version   {}
   home      {}
   repo      {}
   endpoint  {}
   model     {}
   user      {}
   settings  {}
"#,
        env!("CARGO_PKG_VERSION"),
        HOMEPAGE,
        REPO,
        info.endpoint,
        info.model,
        info.user,
        info.db,
    );
}

/// Printed when the REPL ends.
pub fn print_goodbye() {
    println!("goodbye.");
}
