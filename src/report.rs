//! Human-readable listing of matched files.

use crate::filter::MonthFilter;
use crate::torrent::TorrentFile;
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 75;

/// Convert bytes to a rounded binary-unit string (`512B`, `3KiB`, `12MiB`, `2GiB`).
pub fn format_size(size_bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if size_bytes < KIB {
        format!("{}B", size_bytes)
    } else if size_bytes < MIB {
        format!("{:.0}KiB", size_bytes as f64 / KIB as f64)
    } else if size_bytes < GIB {
        format!("{:.0}MiB", size_bytes as f64 / MIB as f64)
    } else {
        format!("{:.0}GiB", size_bytes as f64 / GIB as f64)
    }
}

/// Exact byte count with `,` thousands separators.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn write_no_matches<W: Write>(out: &mut W, filter: &MonthFilter) -> io::Result<()> {
    writeln!(out, "No files found for {}", filter)
}

pub fn write_listing<W: Write>(
    out: &mut W,
    filter: &MonthFilter,
    files: &[TorrentFile],
) -> io::Result<()> {
    writeln!(out, "Found {} files for {}", files.len(), filter)?;
    let separator = "-".repeat(SEPARATOR_WIDTH);
    for file in files {
        writeln!(out, "{}|{}", file.index, file.path)?;
        writeln!(
            out,
            "   |{} ({})",
            format_size(file.length),
            format_thousands(file.length)
        )?;
        writeln!(out, "{}", separator)?;
    }
    Ok(())
}
