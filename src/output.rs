use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::MetricsError;
use crate::types::{CharacterMetrics, CodePoint, Coverage, FontMetrics};

const DECIMALS: f64 = 100_000.0;

/// Format a value as a Dart double literal rounded to five decimals.
pub(crate) fn dart_double(value: f64) -> String {
    let mut rounded = (value * DECIMALS).round() / DECIMALS;
    if rounded == 0.0 {
        // Avoid emitting -0.
        rounded = 0.0;
    }
    let s = rounded.to_string();
    if s.contains('.') || s.contains('e') || !rounded.is_finite() {
        s
    } else {
        s + ".0"
    }
}

fn dart_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Format a metrics table as a Dart map entry keyed by `name`.
///
/// ```
/// use std::collections::BTreeMap;
/// use glyph_metrics::{CharacterMetrics, format_dart};
///
/// let mut chars = BTreeMap::new();
/// chars.insert(65, CharacterMetrics { depth: 0.0, height: 0.7, italic: 0.0, skew: 0.0, width: 0.5 });
/// assert_eq!(
///     format_dart("Demo", &chars).unwrap(),
///     "  \"Demo\": {\n    65: CharacterMetrics(0.0, 0.7, 0.0, 0.0, 0.5),\n  },"
/// );
/// ```
pub fn format_dart(
    name: &str,
    chars: &BTreeMap<CodePoint, CharacterMetrics>,
) -> Result<String, MetricsError> {
    let mut out = String::new();
    writeln!(out, "  {}: {{", dart_string(name))?;
    for (code_point, m) in chars {
        writeln!(
            out,
            "    {}: CharacterMetrics({}, {}, {}, {}, {}),",
            code_point,
            dart_double(m.depth),
            dart_double(m.height),
            dart_double(m.italic),
            dart_double(m.skew),
            dart_double(m.width)
        )?;
    }
    write!(out, "  }},")?;
    Ok(out)
}

/// Name of the generated file for a font at `font_path`.
///
/// ASCII runs keep the file stem as is; complete runs normalise it to
/// lowercase with underscores.
pub fn output_file_name<P: AsRef<Path>>(font_path: P, coverage: Coverage) -> String {
    let stem = font_path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_owned());
    match coverage {
        Coverage::Ascii => format!("{}_metrics.dart", stem),
        Coverage::Complete => format!("{}_complete_metrics.dart", snake_case(&stem)),
    }
}

fn snake_case(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl FontMetrics {
    /// The table entry alone, without the header comments.
    pub fn to_dart(&self) -> Result<String, MetricsError> {
        format_dart(&self.key, &self.chars)
    }

    /// Full contents of the generated `.dart` file.
    pub fn to_dart_file(&self) -> Result<String, MetricsError> {
        let mut out = String::new();
        writeln!(out, "// Generated font metrics for {}", self.display_name)?;
        if self.coverage == Coverage::Complete {
            writeln!(out, "// Total characters: {}", self.chars.len())?;
        }
        writeln!(out, "// Add this to your fontMetricsData map")?;
        writeln!(out)?;
        out.push_str(&self.to_dart()?);
        out.push('\n');
        Ok(out)
    }

    /// Write the `.dart` file to `path`.
    pub fn write_dart<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, MetricsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_dart_file()?)?;
        info!("Dart code saved to {}", path.display());
        Ok(path.to_path_buf())
    }
}
