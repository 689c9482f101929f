use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Collects the Ruby files under a root, honoring `.gitignore` plus any
/// configured ignore patterns.
pub struct FileWalker {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let is_ruby = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "rb")
            .unwrap_or(false);
        if !is_ruby {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| path_str.contains(pattern.trim_end_matches("/**")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_only_ruby_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rb"), "x = 1").unwrap();
        fs::write(dir.path().join("b.py"), "x = 1").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/c.rb"), "y = 2").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.rb", "c.rb"]);
    }

    #[test]
    fn single_file_root_is_returned_directly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.rb");
        fs::write(&file, "x = 1").unwrap();

        let files = FileWalker::new(file.clone()).walk().unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn ignore_patterns_exclude_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/gem.rb"), "x = 1").unwrap();
        fs::write(dir.path().join("app.rb"), "x = 1").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_ignore_patterns(vec!["vendor/**".to_string()])
            .walk()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.rb"));
    }
}
