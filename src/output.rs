use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::cli::OutputFormat;

/// Writes the samples to stdout or a file in the specified format.
pub fn write_samples(
    samples: &[u64],
    format: &OutputFormat,
    output_file: Option<&Path>,
) -> io::Result<()> {
    match output_file {
        Some(path) => {
            let f = File::create(path)?;
            let mut out = BufWriter::new(f);
            format_samples(samples, format, &mut out)?;
            out.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            format_samples(samples, format, &mut out)?;
            out.flush()
        }
    }
}

/// Little-endian byte stream of the samples.
fn to_le_bytes(samples: &[u64]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn format_samples(samples: &[u64], format: &OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Decimal => {
            for s in samples {
                writeln!(out, "{}", s)?;
            }
        }
        OutputFormat::Hex => {
            for s in samples {
                writeln!(out, "{:016x}", s)?;
            }
        }
        OutputFormat::Raw => {
            out.write_all(&to_le_bytes(samples))?;
        }
        OutputFormat::Base64 => {
            writeln!(out, "{}", STANDARD.encode(to_le_bytes(samples)))?;
        }
        OutputFormat::Base64url => {
            writeln!(out, "{}", URL_SAFE_NO_PAD.encode(to_le_bytes(samples)))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_to_string(samples: &[u64], fmt: &OutputFormat) -> String {
        let mut buf = Vec::new();
        format_samples(samples, fmt, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_decimal() {
        let out = format_to_string(&[0, 42, 18_446_744_073_709_551_615], &OutputFormat::Decimal);
        assert_eq!(out, "0\n42\n18446744073709551615\n");
    }

    #[test]
    fn test_hex() {
        let out = format_to_string(&[0xdead_beef, 1], &OutputFormat::Hex);
        assert_eq!(out, "00000000deadbeef\n0000000000000001\n");
    }

    #[test]
    fn test_raw_little_endian() {
        let mut buf = Vec::new();
        format_samples(&[0x0102, 0xff], &OutputFormat::Raw, &mut buf).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[..2], &[0x02, 0x01]);
        assert_eq!(buf[8], 0xff);
        assert!(buf[2..8].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_base64() {
        let out = format_to_string(&[0], &OutputFormat::Base64);
        assert_eq!(out, "AAAAAAAAAAA=\n");
    }

    #[test]
    fn test_base64url() {
        let out = format_to_string(&[u64::MAX], &OutputFormat::Base64url);
        // base64url should not contain + or / or padding
        assert!(!out.contains('+'));
        assert!(!out.contains('/'));
        assert!(!out.contains('='));
        assert_eq!(out, "__________8\n");
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(format_to_string(&[], &OutputFormat::Decimal), "");
        assert_eq!(format_to_string(&[], &OutputFormat::Base64), "\n");
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join("jitterharvest_test_samples.dat");
        write_samples(&[3, 1, 4], &OutputFormat::Decimal, Some(&path)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "3\n1\n4\n");
        let _ = std::fs::remove_file(&path);
    }
}
