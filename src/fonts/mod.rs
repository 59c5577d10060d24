//! Font loading utilities for the `datareport` crate.
//!
//! The report needs one TrueType family for the PDF text and the regular face of
//! that family for chart labels.  Fonts are searched in this order:
//!
//! 1. the directory named by `DATAREPORT_FONTS_DIR`,
//! 2. `assets/fonts` next to the running executable,
//! 3. `assets/fonts` inside the crate,
//!
//! each expected to hold the Roboto family.  When none of them is complete, a
//! system family (Liberation Sans or DejaVu Sans on Unix, Arial on Windows) is
//! used instead.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "DATAREPORT_FONTS_DIR";

/// Environment variable overriding the system font directory used as fallback.
pub const SYSTEM_FONTS_DIR_ENV: &str = "DATAREPORT_SYSTEM_FONTS_DIR";

struct FontFiles {
    family: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FontFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }
}

const BUNDLED_FONT_FILES: FontFiles = FontFiles {
    family: DEFAULT_FONT_FAMILY_NAME,
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const SYSTEM_FONT_FILES: &[FontFiles] = &[
    FontFiles {
        family: "Liberation Sans",
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    FontFiles {
        family: "DejaVu Sans",
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
    FontFiles {
        family: "Arial",
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
];

/// Fonts used by a report: the PDF family plus raw bytes of the regular face for charts.
pub struct ReportFonts {
    /// Family handed to `genpdf`.
    pub family: FontFamily<FontData>,
    /// TrueType data of the regular face.
    pub chart_font: Vec<u8>,
    /// Name of the family that was loaded.
    pub family_name: &'static str,
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn system_directory_candidates() -> Vec<PathBuf> {
    if let Some(path) = env_path(SYSTEM_FONTS_DIR_ENV) {
        return vec![path];
    }

    let mut candidates = Vec::new();

    #[cfg(windows)]
    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            candidates.push(root.join("Fonts"));
        }
    }

    #[cfg(unix)]
    for dir in [
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/truetype/liberation2",
        "/usr/share/fonts/liberation-sans",
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/dejavu",
        "/usr/share/fonts/TTF",
    ] {
        candidates.push(PathBuf::from(dir));
    }

    candidates
}

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn missing_font_files(path: &Path, files: &FontFiles) -> Vec<&'static str> {
    files
        .all()
        .into_iter()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_bundled_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate, &BUNDLED_FONT_FILES);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            format!("missing files [{}]", missing.join(", "))
        };
        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate bundled font directory. Checked: {}. Set {} to a directory with the Roboto family.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn resolve_system_fonts() -> Option<(PathBuf, &'static FontFiles)> {
    system_directory_candidates().into_iter().find_map(|dir| {
        SYSTEM_FONT_FILES
            .iter()
            .find(|files| dir.is_dir() && missing_font_files(&dir, files).is_empty())
            .map(|files| (dir.clone(), files))
    })
}

fn read_font(directory: &Path, file: &str, style: &str) -> Result<Vec<u8>, Error> {
    let path = directory.join(file);
    fs::read(&path).map_err(|err| {
        Error::new(
            format!("Failed to read {} font at {}", style, path.display()),
            err,
        )
    })
}

fn parse_font(data: Vec<u8>, family: &str, style: &str) -> Result<FontData, Error> {
    FontData::new(data, None).map_err(|err| {
        Error::new(
            format!("Failed to parse {} face of font family '{}': {}", style, family, err),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

fn load_family(directory: &Path, files: &'static FontFiles) -> Result<ReportFonts, Error> {
    let regular = read_font(directory, files.regular, "regular")?;
    let chart_font = regular.clone();

    let family = FontFamily {
        regular: parse_font(regular, files.family, "regular")?,
        bold: parse_font(read_font(directory, files.bold, "bold")?, files.family, "bold")?,
        italic: parse_font(read_font(directory, files.italic, "italic")?, files.family, "italic")?,
        bold_italic: parse_font(
            read_font(directory, files.bold_italic, "bold italic")?,
            files.family,
            "bold italic",
        )?,
    };

    debug!("loaded font family '{}' from {}", files.family, directory.display());
    Ok(ReportFonts {
        family,
        chart_font,
        family_name: files.family,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the bundled Roboto family, falling back to a system family when the
/// bundled fonts are missing.
pub fn load_report_fonts() -> Result<ReportFonts, Error> {
    let bundled = resolve_bundled_directory().and_then(|dir| load_family(&dir, &BUNDLED_FONT_FILES));
    match bundled {
        Ok(fonts) => Ok(fonts),
        Err(err) if fonts_missing(&err) => match resolve_system_fonts() {
            Some((directory, files)) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to system '{}' family.",
                    err, files.family
                );
                load_family(&directory, files)
            }
            None => {
                warn!("Bundled fonts unavailable ({}); no system fallback found", err);
                Err(Error::new(
                    format!("Bundled fonts unavailable and no system fallback found: {}", err),
                    io::Error::new(io::ErrorKind::NotFound, "report fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether a complete font family, bundled or system, can be found.
pub fn report_fonts_available() -> bool {
    resolve_bundled_directory().is_ok() || resolve_system_fonts().is_some()
}
