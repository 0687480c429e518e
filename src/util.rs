// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use anyhow::{Context, Result};

pub fn read_file(path: &str) -> Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .with_context(|| format!("Failed to read {}", path))?;

    Ok(buf)
}

pub fn read_file_str(path: &str) -> Result<String> {
    let content = read_file(path)?;
    let str = String::from_utf8(content)
        .with_context(|| format!("{} is not valid UTF-8", path))?;
    Ok(str)
}

/// 996000000 -> "996MHz", 32768 -> "32.768kHz"
pub fn fmt_rate(rate: u64) -> String {
    let units = [(1_000_000_000, "GHz"), (1_000_000, "MHz"), (1_000, "kHz")];
    for (scale, unit) in units {
        if rate >= scale {
            let int = rate / scale;
            let frac = rate % scale;
            if frac == 0 {
                return format!("{}{}", int, unit);
            }
            let digits = scale.to_string().len() - 1;
            let frac = format!("{:0width$}", frac, width = digits);
            return format!("{}.{}{}", int, frac.trim_end_matches('0'), unit);
        }
    }
    format!("{}Hz", rate)
}
