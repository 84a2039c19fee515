// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and `code`.\n\n- [ ] Task item\n- [x] Done item\n\n> Quoted [link](https://example.com \"Example\")\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// Offset of a word in the middle of `content`, for single-edit benchmarks.
#[allow(dead_code)]
pub fn middle_edit_offset(content: &str) -> usize {
    let mid = content.len() / 2;
    content[mid..]
        .find("content")
        .map_or(mid, |i| mid + i)
}
