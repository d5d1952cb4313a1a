//! Output path mirroring and writing of generated files

use crate::config::runtime::TranslationPreferences;
use crate::logging::codes;
use crate::{log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    #[error("{input} is not inside project root {root}")]
    OutsideProjectRoot { input: String, root: String },

    #[error("cannot create output directory {path}: {message}")]
    CreateDirectory { path: String, message: String },

    #[error("cannot write {path}: {message}")]
    Write { path: String, message: String },
}

impl OutputError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            OutputError::OutsideProjectRoot { .. } => codes::output::OUTPUT_PATH_INVALID,
            OutputError::CreateDirectory { .. } => codes::output::OUTPUT_DIRECTORY_FAILURE,
            OutputError::Write { .. } => codes::output::OUTPUT_WRITE_FAILURE,
        }
    }
}

/// Where generated files go: the input's path relative to the project
/// root, re-rooted under the output root, with the target extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    project_root: PathBuf,
    output_root: PathBuf,
    target_extension: String,
}

impl OutputLayout {
    /// Layout with the default output directory inside `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            output_root: project_root.join(super::DEFAULT_OUTPUT_DIR_NAME),
            project_root,
            target_extension: super::DEFAULT_TARGET_EXTENSION.to_string(),
        }
    }

    pub fn from_preferences(
        project_root: impl Into<PathBuf>,
        preferences: &TranslationPreferences,
    ) -> Self {
        let project_root = project_root.into();
        Self {
            output_root: project_root.join(&preferences.output_dir_name),
            project_root,
            target_extension: preferences.target_extension.clone(),
        }
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn with_target_extension(mut self, extension: &str) -> Self {
        self.target_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// True if `path` lies inside the output root
    pub fn is_in_output(&self, path: &Path) -> bool {
        path.starts_with(&self.output_root)
            || matches!(
                (path.canonicalize(), self.output_root.canonicalize()),
                (Ok(path), Ok(root)) if path.starts_with(&root)
            )
    }

    fn relative_path(&self, input: &Path) -> Option<PathBuf> {
        if let Ok(relative) = input.strip_prefix(&self.project_root) {
            return Some(relative.to_path_buf());
        }
        let input = input.canonicalize().ok()?;
        let root = self.project_root.canonicalize().ok()?;
        input.strip_prefix(root).ok().map(Path::to_path_buf)
    }

    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf, OutputError> {
        let relative = self
            .relative_path(input)
            .filter(|relative| relative.file_name().is_some())
            .ok_or_else(|| OutputError::OutsideProjectRoot {
                input: input.display().to_string(),
                root: self.project_root.display().to_string(),
            })?;

        let mut output = self.output_root.join(relative);
        output.set_extension(&self.target_extension);
        Ok(output)
    }

    /// Write `content` to the mirrored output path of `input`, creating
    /// parent directories. Returns the written path.
    pub fn write_output(&self, input: &Path, content: &str) -> Result<PathBuf, OutputError> {
        let result = self.write_output_inner(input, content);
        match &result {
            Ok(path) => log_success!(codes::success::OUTPUT_WRITTEN, "Generated file written",
                "output" => path.display(),
                "bytes" => content.len()
            ),
            Err(error) => log_error!(error.error_code(), &error.to_string(),
                "input" => input.display()
            ),
        }
        result
    }

    fn write_output_inner(&self, input: &Path, content: &str) -> Result<PathBuf, OutputError> {
        let output = self.output_path_for(input)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| OutputError::CreateDirectory {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }

        fs::write(&output, content).map_err(|e| OutputError::Write {
            path: output.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_output_path_mirrors_input() {
        let layout = OutputLayout::new("/proj");
        assert_eq!(layout.output_root(), Path::new("/proj/生成"));
        assert_eq!(
            layout.output_path_for(Path::new("/proj/包/模块.pyzh")).unwrap(),
            PathBuf::from("/proj/生成/包/模块.py")
        );
        assert_eq!(
            layout.output_path_for(Path::new("/proj/main.pyzh")).unwrap(),
            PathBuf::from("/proj/生成/main.py")
        );
    }

    #[test]
    fn test_custom_output_root_and_extension() {
        let layout = OutputLayout::new("/proj")
            .with_output_root("/out")
            .with_target_extension(".pyw");
        assert_eq!(
            layout.output_path_for(Path::new("/proj/a/b.pyzh")).unwrap(),
            PathBuf::from("/out/a/b.pyw")
        );
    }

    #[test]
    fn test_from_preferences() {
        let preferences = TranslationPreferences {
            source_extension: "pyzh".to_string(),
            target_extension: "py3".to_string(),
            output_dir_name: "build".to_string(),
            runtime_module: "rt".to_string(),
            keyword_table_path: None,
        };
        let layout = OutputLayout::from_preferences("/p", &preferences);
        assert_eq!(
            layout.output_path_for(Path::new("/p/x.pyzh")).unwrap(),
            PathBuf::from("/p/build/x.py3")
        );
    }

    #[test]
    fn test_input_outside_project_root() {
        let layout = OutputLayout::new("/proj");
        let err = layout.output_path_for(Path::new("/elsewhere/a.pyzh")).unwrap_err();
        assert_matches!(err, OutputError::OutsideProjectRoot { .. });
        assert_eq!(err.error_code(), codes::output::OUTPUT_PATH_INVALID);

        assert!(layout.output_path_for(Path::new("/proj")).is_err());
    }

    #[test]
    fn test_write_output_creates_directories() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let input = dir.path().join("包").join("模块.pyzh");

        let written = layout.write_output(&input, "from x import *\n").unwrap();
        assert_eq!(written, dir.path().join("生成").join("包").join("模块.py"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "from x import *\n");
        assert!(layout.is_in_output(&written));
        assert!(!layout.is_in_output(&input));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("生成");
        fs::write(&blocker, "not a directory").unwrap();

        let layout = OutputLayout::new(dir.path());
        let err = layout
            .write_output(&dir.path().join("a.pyzh"), "x")
            .unwrap_err();
        assert_matches!(err, OutputError::CreateDirectory { .. });
    }
}
