use anyhow::{Context, Result, anyhow};
use std::{io::BufRead, str::FromStr};

/// Reads the line-based file formats of the simulator. Lines starting with `#` are comments.
pub struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    line_no: usize,
    line: String,
}

impl<'a> LineReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a)) -> Self {
        LineReader::<'a> {
            reader: reader,
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn get_last_line_number(&self) -> usize {
        self.line_no
    }

    pub fn get_last_line(&self) -> &str {
        &self.line
    }

    pub fn next_line_raw(&mut self) -> Result<()> {
        self.line.clear();

        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(anyhow!(
                "the file ended after line {}, but more lines were expected",
                self.line_no
            ));
        }
        let content_length = self
            .line
            .strip_suffix('\n')
            .map(|line| line.trim_end_matches('\r').len());
        if let Some(length) = content_length {
            self.line.truncate(length);
        }
        self.line_no += 1;
        Ok(())
    }

    /**
     * Reads the next line that is not a comment.
     */
    pub fn next_line(&mut self) -> Result<()> {
        self.next_line_raw()?;
        while self.get_last_line().trim_start().starts_with('#') {
            self.next_line_raw()?;
        }
        Ok(())
    }

    pub fn next_line_string(&mut self) -> Result<String> {
        self.next_line()?;
        Ok(self.get_last_line().to_string())
    }

    /**
     * Reads the next line, which must start with `prefix` followed by a space, and returns the remainder.
     */
    pub fn next_line_prefixed(&mut self, prefix: &str) -> Result<String> {
        self.next_line()?;
        let line = self.get_last_line().trim_start();
        match line.strip_prefix(prefix).and_then(|rest| rest.strip_prefix(' ')) {
            Some(rest) if !rest.is_empty() => Ok(rest.to_string()),
            _ => Err(anyhow!(
                "line {} should start with `{} `; found `{}`",
                self.get_last_line_number(),
                prefix,
                self.get_last_line()
            )),
        }
    }

    /**
     * Reads a count, or the index of a place or transition.
     */
    pub fn next_line_index(&mut self) -> Result<usize> {
        self.next_line_parsed("a count or an index")
    }

    /**
     * Reads the number of tokens of a place in a marking.
     */
    pub fn next_line_natural(&mut self) -> Result<u64> {
        self.next_line_parsed("a number of tokens")
    }

    fn next_line_parsed<T>(&mut self, expected: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.next_line()?;
        self.get_last_line().trim().parse::<T>().with_context(|| {
            format!(
                "line {} should hold {} (a non-negative whole number); found `{}`",
                self.get_last_line_number(),
                expected,
                self.get_last_line()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::LineReader;

    #[test]
    fn skips_comments() {
        let mut reader = Cursor::new("# a comment\n3\n# another\r\nid t1\n");
        let mut lreader = LineReader::new(&mut reader);

        assert_eq!(lreader.next_line_index().unwrap(), 3);
        assert_eq!(lreader.next_line_prefixed("id").unwrap(), "t1");
        assert_eq!(lreader.get_last_line_number(), 4);
        assert!(lreader.next_line().is_err());
    }

    #[test]
    fn prefix_mismatch() {
        let mut reader = Cursor::new("label a\n");
        let mut lreader = LineReader::new(&mut reader);

        assert!(lreader.next_line_prefixed("id").is_err());
    }

    #[test]
    fn tells_what_was_expected() {
        let mut reader = Cursor::new("petri net\n-1\n");
        let mut lreader = LineReader::new(&mut reader);

        lreader.next_line().unwrap();
        let err = lreader.next_line_natural().unwrap_err();
        assert!(format!("{}", err).contains("line 2 should hold a number of tokens"));

        let err = lreader.next_line_index().unwrap_err();
        assert!(format!("{}", err).contains("ended after line 2"));
    }
}
