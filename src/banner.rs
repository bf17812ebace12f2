//! Startup banner.

use crate::consts::{AUTHOR, HOMEPAGE};

/// What the banner reports about this session.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub trace_project: &'a str,
    pub trace_endpoint: &'a str,
}

pub fn render_banner(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║              A U G U R                ║
   ║      ask once, hear one answer        ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   model     {}
   tracing   {} @ {}

   Type a question and press enter. `quit` or Ctrl+D to leave.
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        info.model,
        info.trace_project,
        info.trace_endpoint,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}
