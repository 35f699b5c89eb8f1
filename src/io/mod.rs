//! Output targets for solver progress and summary printing.
//!
//! Everything the eigensolvers print goes through a [`PrintTarget`].  The
//! target defaults to stdout and can be redirected with the
//! [`ConfigurablePrintTarget`] methods available on the solvers.

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

/// Destination of printed output
#[derive(Default)]
pub enum PrintTarget {
    #[default]
    Stdout,
    File(File),
    /// in-memory capture, read back with [`ConfigurablePrintTarget::get_print_buffer`]
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
}

impl PrintTarget {
    fn name(&self) -> &'static str {
        match self {
            PrintTarget::Stdout => "Stdout",
            PrintTarget::File(_) => "File",
            PrintTarget::Buffer(_) => "Buffer",
            PrintTarget::Stream(_) => "Stream",
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget::{}", self.name())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout => std::io::stdout().lock().write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => buffer.write(buf),
            PrintTarget::Stream(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout => std::io::stdout().flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Buffer(_) => Ok(()),
            PrintTarget::Stream(stream) => stream.flush(),
        }
    }
}

/// Redirection of printed output, implemented by the solvers
pub trait ConfigurablePrintTarget {
    fn print_to_stdout(&mut self);
    fn print_to_file(&mut self, file: File);
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// capture output in memory, discarding anything captured earlier
    fn print_to_buffer(&mut self);
    /// Contents captured since the last call to `print_to_buffer`.  Fails
    /// if output is not being captured.
    fn get_print_buffer(&mut self) -> Result<String>;
    fn print_target(&mut self) -> &dyn Write;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout;
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            other => Err(Error::new(
                ErrorKind::Other,
                format!("output is going to {:?}, not to a buffer", other),
            )),
        }
    }

    fn print_target(&mut self) -> &dyn Write {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_capture() {
        let mut target = PrintTarget::default();
        assert!(target.get_print_buffer().is_err());

        target.print_to_buffer();
        write!(target, "λ = {:.3e}", 1.5f64).unwrap();
        assert_eq!(target.get_print_buffer().unwrap(), "λ = 1.500e0");

        // redirecting again starts from empty
        target.print_to_buffer();
        assert_eq!(target.get_print_buffer().unwrap(), "");
    }
}
