use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Format `values` as an R assignment, `name=c(v1,v2,...)`.
pub fn r_vector<T: Display>(name: &str, values: &[T]) -> String {
    let body: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{name}=c({})", body.join(","))
}

/// Append `values` to `path` as an R assignment on a new line, creating the
/// file if needed. Load the result in R with `source(path)`.
pub fn append_r_vector<P: AsRef<Path>, T: Display>(path: P, name: &str, values: &[T]) -> io::Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    write!(f, "\n{}", r_vector(name, values))?;
    f.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn formats_assignment() {
        assert_eq!(r_vector("x", &[3u64, 14, 15]), "x=c(3,14,15)");
        assert_eq!(r_vector::<u64>("empty", &[]), "empty=c()");
    }

    #[test]
    fn appends_lines() {
        let tmp = NamedTempFile::new().unwrap();
        append_r_vector(tmp.path(), "x", &[1, 2]).unwrap();
        append_r_vector(tmp.path(), "y", &[3]).unwrap();
        let text = std::fs::read_to_string(tmp.path()).unwrap();
        assert_eq!(text, "\nx=c(1,2)\ny=c(3)");
    }
}
