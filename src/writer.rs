use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub struct Writer;

impl Writer {
    pub fn new() -> Self {
        Writer
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>, content: &str) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        f.write_all(content.as_bytes())
    }

    /// Writes a listing, one line per entry, trailing newline included.
    pub fn write_lines(&self, path: impl AsRef<Path>, lines: &[String]) -> io::Result<()> {
        let mut content = lines.join("\n");
        content.push('\n');
        self.write_to_file(path, &content)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_to_file() {
        let writer = Writer::new();
        let path = std::env::temp_dir().join("writer_test_output.asm");
        writer.write_to_file(&path, "mov eax, 0").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "mov eax, 0");
        fs::remove_file(&path).unwrap(); // Clean up
    }

    #[test]
    fn test_write_lines_joins_with_newlines() {
        let writer = Writer::new();
        let path = std::env::temp_dir().join("writer_test_lines.asm");
        writer
            .write_lines(&path, &["main proc".to_string(), "main endp".to_string()])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "main proc\nmain endp\n");
        fs::remove_file(&path).unwrap(); // Clean up
    }

    #[test]
    fn test_write_truncates_previous_content() {
        let writer = Writer::new();
        let path = std::env::temp_dir().join("writer_test_truncate.asm");
        writer.write_to_file(&path, "a longer first version").unwrap();
        writer.write_to_file(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
        fs::remove_file(&path).unwrap(); // Clean up
    }
}
