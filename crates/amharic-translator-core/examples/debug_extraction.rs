//! Print the positioned text runs extracted from a PDF.
//!
//! Usage: `cargo run --example debug_extraction -- <file.pdf> [page]`

use std::path::PathBuf;
use amharic_translator_core::pdf::extract_pages_from_file;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let Some(pdf_path) = args.get(1).map(PathBuf::from) else {
        eprintln!("Usage: debug_extraction <file.pdf> [page]");
        std::process::exit(2);
    };
    let only_page = args.get(2).and_then(|p| p.parse::<u32>().ok());

    println!("Reading PDF: {}", pdf_path.display());

    let pages = extract_pages_from_file(&pdf_path).expect("Failed to read PDF");
    if pages.is_empty() {
        println!("No extractable text");
        return;
    }

    for page in pages
        .iter()
        .filter(|p| only_page.is_none_or(|n| n == p.page_number))
    {
        println!(
            "=== Page {} ({:.0}x{:.0}, rotate {}) - {} runs ===",
            page.page_number,
            page.width,
            page.height,
            page.rotation,
            page.runs.len()
        );
        for run in &page.runs {
            println!(
                "({:7.1}, {:7.1}) {:5.1}pt {:<20} {}",
                run.x, run.y, run.font_size, run.font_name, run.text
            );
        }
        println!();
    }
}
