use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const UNIPRO_DIR: &str = ".unipro";

pub fn read_text_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

pub fn read_stdin_text() -> io::Result<String> {
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    Ok(text)
}

pub fn home_dir() -> io::Result<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))
}

/// `~/.unipro`, holding the config, theme and log files.
pub fn unipro_dir() -> io::Result<PathBuf> {
    Ok(home_dir()?.join(UNIPRO_DIR))
}

pub fn default_config_file_path() -> io::Result<PathBuf> {
    Ok(unipro_dir()?.join("config.toml"))
}

pub fn default_theme_file_path() -> io::Result<PathBuf> {
    Ok(unipro_dir()?.join("theme.toml"))
}

pub fn default_log_file_path() -> PathBuf {
    unipro_dir()
        .unwrap_or_else(|_| env::temp_dir())
        .join("unipro.log")
}

/// File extension for code saved from a pane.
pub fn extension_for_language(language: &str) -> &'static str {
    let language = language.trim().to_ascii_lowercase();
    let base = language.split('_').next().unwrap_or(&language);
    match base {
        "python" | "py" => "py",
        "java" => "java",
        "c" => "c",
        "cpp" | "c++" => "cpp",
        "csharp" | "cs" => "cs",
        "javascript" | "js" => "js",
        "typescript" | "ts" => "ts",
        "rust" | "rs" => "rs",
        "go" | "golang" => "go",
        "kotlin" => "kt",
        "swift" => "swift",
        "ruby" => "rb",
        "php" => "php",
        "sql" => "sql",
        "html" => "html",
        "css" => "css",
        "bash" | "shell" | "sh" => "sh",
        "latex" | "tex" => "tex",
        "markdown" | "md" => "md",
        _ => "txt",
    }
}

pub fn default_save_file_name(language: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("unipro-{secs}.{}", extension_for_language(language))
}

/// Writes pane content to `target`, or to a generated file name in `cwd` when no target is
/// given. A directory target receives the generated name.
pub fn save_pane_content(
    target: Option<&Path>,
    cwd: &Path,
    language: &str,
    content: &str,
) -> io::Result<PathBuf> {
    let path = match target {
        Some(target) => {
            let target = if target.is_absolute() {
                target.to_path_buf()
            } else {
                cwd.join(target)
            };
            if target.is_dir() {
                target.join(default_save_file_name(language))
            } else {
                target
            }
        }
        None => cwd.join(default_save_file_name(language)),
    };
    let mut text = content.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    write_text_file_atomic(&path, &text)?;
    log::info!("saved {} bytes to {}", text.len(), path.display());
    Ok(path)
}

fn write_text_file_atomic(path: &Path, text: &str) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("unipro-output");
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    for attempt in 0..16u8 {
        let tmp = parent.join(format!(".{file_name}.tmp-{pid}-{nanos}-{attempt}"));
        match OpenOptions::new().write(true).create_new(true).open(&tmp) {
            Ok(file) => {
                let mut writer = BufWriter::new(file);
                writer.write_all(text.as_bytes())?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
                if let Err(err) = fs::rename(&tmp, path) {
                    let _ = fs::remove_file(&tmp);
                    return Err(err);
                }
                return Ok(());
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "failed to allocate temporary file name",
    ))
}
