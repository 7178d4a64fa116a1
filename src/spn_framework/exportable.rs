use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub trait Exportable {
    fn export(&self, f: &mut dyn Write) -> Result<()>;

    fn export_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("could not create {:?}", path))?;
        let mut writer = BufWriter::new(file);
        self.export(&mut writer)?;
        Ok(writer.flush()?)
    }

    fn export_to_string(&self) -> Result<String> {
        let mut result = vec![];
        self.export(&mut result)?;
        Ok(String::from_utf8(result)?)
    }
}

impl Exportable for String {
    fn export(&self, f: &mut dyn Write) -> Result<()> {
        Ok(writeln!(f, "{}", self)?)
    }
}
