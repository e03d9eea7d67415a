#![no_main]
use gridgen::neighbors;
use gridgen::output::{OutputMode, format_grid};
use gridgen::reader::{parse_flag_document, parse_grid};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes through both readers. A grid the strict reader accepts must
// re-render in both layouts and parse back to the same grid; a flag document
// must count the same with fill and windowed scan.
fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = parse_flag_document(data) {
        if doc.flags.total() <= 4096 {
            let d = doc.threshold.unwrap_or(2).min(16);
            let fill = neighbors::count_fill(&doc.flags, d);
            assert_eq!(fill, neighbors::count_scan(&doc.flags, d, None));
            assert_eq!(fill, neighbors::count_scan(&doc.flags, d, Some(3)));
        }
    }

    let Ok(grid) = parse_grid(data) else {
        return;
    };

    for mode in [OutputMode::Rows, OutputMode::Compact] {
        let text = format_grid(&grid, mode);
        let again = parse_grid(text.as_bytes()).expect("rendered grid failed to parse");
        assert_eq!(again, grid);
    }
});
