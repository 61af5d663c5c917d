use chrono::NaiveDateTime;
use datepattern::ElementSummary;
use std::time::Duration;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(
    input: &str,
    elements: &[ElementSummary],
    outcome: Option<(usize, NaiveDateTime)>,
    elapsed: Duration,
    color: bool,
) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: \"{}\"", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Elements ━━━", ansi::GRAY));
    print_elements(elements, &palette);

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match outcome {
        Some((consumed, date)) => {
            println!(
                "  {} {} {}",
                palette.bold(palette.paint(date.format("%Y-%m-%d %H:%M:%S%.3f").to_string(), ansi::GREEN)),
                palette.dim("│"),
                palette.paint(format!("consumed {consumed}/{} bytes", input.len()), ansi::YELLOW),
            );
        }
        None => {
            println!("{}", palette.dim("  No parse"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • A literal or whitespace element has no match");
            println!("  • An abutting digit run does not decompose");
            println!("  • --validate rejected a non-round-tripping date");
            println!("\n{}", palette.dim("  Tip: Set DATEPATTERN_DEBUG=1 to see element-level traces"));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!("  Total: {}", palette.paint(format!("{:?}", elapsed), ansi::GREEN));
    println!();
}

fn print_elements(elements: &[ElementSummary], palette: &ansi::Palette) {
    for (idx, element) in elements.iter().enumerate() {
        let mut flags = String::new();
        if element.numeric {
            flags.push_str(" numeric");
        }
        if element.abut_start {
            flags.push_str(" abut-head");
        }
        println!(
            "  {} {} {}{}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.paint(element.kind, ansi::BLUE),
            palette.bold(&element.detail),
            palette.dim(flags),
        );
    }
}
