use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_success};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{fs, io};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing::*;
        match self {
            Self::FileNotFound { .. } => FILE_NOT_FOUND,
            Self::FileTooLarge { .. } => FILE_TOO_LARGE,
            Self::EmptyFile => EMPTY_FILE,
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => INVALID_ENCODING,
            Self::IoError { .. } => IO_ERROR,
            Self::InvalidPath { .. } => INVALID_PATH,
            Self::TooManyLines { .. } => TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    /// Classify an I/O failure on `path`
    fn from_io(path: &Path, error: &io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => Self::FileNotFound { path },
            ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        format_size(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn format_size(bytes: u64) -> String {
    match bytes {
        b if b < 1024 => format!("{} B", b),
        b if b < 1024 * 1024 => format!("{:.2} KB", b as f64 / 1024.0),
        b => format!("{:.2} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        match self.processing_duration.as_secs_f64() * 1000.0 {
            ms if ms > 0.0 => self.char_count() as f64 / ms,
            _ => 0.0,
        }
    }
}

/// Reads source, grammar and token files within the compile-time size limits
pub struct FileProcessor {
    pub enable_performance_logging: bool,
    /// Return zero-length files instead of rejecting them
    pub allow_empty: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            enable_performance_logging: true,
            allow_empty: false,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            enable_performance_logging: prefs.enable_performance_logging,
            allow_empty: prefs.allow_empty_source,
        }
    }

    pub fn with_empty_allowed(mut self, allowed: bool) -> Self {
        self.allow_empty = allowed;
        self
    }

    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        let started = Instant::now();
        log_debug!("Reading file", "file" => file_path);

        let result = self.load(file_path, started);
        match &result {
            Ok(loaded) => self.log_loaded(loaded, file_path),
            Err(error) => log_error!(error.error_code(), &error.to_string(), "file" => file_path),
        }
        result
    }

    fn load(&self, file_path: &str, started: Instant) -> Result<FileProcessingResult, FileProcessorError> {
        if file_path.trim().is_empty() {
            return Err(FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            });
        }

        let path = Path::new(file_path);
        let stat = fs::metadata(path).map_err(|e| FileProcessorError::from_io(path, &e))?;
        if !stat.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            });
        }

        let size = stat.len();
        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if size == 0 && !self.allow_empty {
            return Err(FileProcessorError::EmptyFile);
        }

        let source = fs::read_to_string(path).map_err(|e| FileProcessorError::from_io(path, &e))?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            return Err(FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            });
        }

        Ok(FileProcessingResult {
            source,
            metadata: FileMetadata {
                path: path.to_path_buf(),
                size,
                line_count,
            },
            processing_duration: started.elapsed(),
        })
    }

    fn log_loaded(&self, loaded: &FileProcessingResult, file_path: &str) {
        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File read",
                "file" => file_path,
                "size" => loaded.metadata.human_readable_size(),
                "lines" => loaded.metadata.line_count,
                "large_file" => loaded.metadata.is_large_file(),
                "duration_ms" => format!("{:.2}", loaded.processing_duration.as_secs_f64() * 1000.0),
                "chars_per_ms" => format!("{:.2}", loaded.processing_rate())
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File read",
                "file" => file_path,
                "lines" => loaded.metadata.line_count
            );
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
