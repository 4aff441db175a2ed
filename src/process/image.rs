use std::ffi::{CStr, CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use nix::unistd;

use crate::errors::*;
use crate::process::environment::Environment;

/// The positional part of the command line: `<path> [arg...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    path: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    #[cfg(test)]
    pub fn new<P, I, A>(path: P, args: I) -> CommandLine
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        CommandLine {
            path: path.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits raw positional values into the target path and the forwarded
    /// arguments. An empty list has no path and is a usage error.
    pub fn from_values<I, A>(values: I) -> Result<CommandLine>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let mut values = values.into_iter().map(Into::into);
        let path = values.next().ok_or_else(Error::missing_path)?;

        Ok(CommandLine {
            path: path,
            args: values.collect(),
        })
    }

    pub fn path(&self) -> &OsStr {
        &self.path
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// Everything `execve` needs, already converted to C strings so that nothing
/// is left to allocate between the trace request and the image replacement.
#[derive(Debug, PartialEq)]
pub struct ProcessImage {
    path: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl ProcessImage {
    /// `argv[0]` is the target path itself, followed by the forwarded
    /// arguments.
    pub fn new(command: &CommandLine, env: &Environment) -> Result<ProcessImage> {
        let path = to_cstring("program path", command.path())?;
        let mut argv = Vec::with_capacity(command.args().len() + 1);
        argv.push(path.clone());
        for arg in command.args() {
            argv.push(to_cstring("argument", arg)?);
        }

        Ok(ProcessImage {
            path: path,
            argv: argv,
            envp: env.to_envp()?,
        })
    }

    pub fn path(&self) -> &CStr {
        &self.path
    }

    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    pub fn envp(&self) -> &[CString] {
        &self.envp
    }

    /// Replaces the current process image. It only ever returns on failure,
    /// and the returned error carries the `errno` of `execve`.
    pub fn exec(&self) -> Error {
        match unistd::execve(&self.path, self.argv.as_slice(), self.envp.as_slice()) {
            Ok(never) => match never {},
            Err(errno) => Error::Exec(
                PathBuf::from(OsStr::from_bytes(self.path.as_bytes())),
                errno,
            ),
        }
    }
}

fn to_cstring(what: &str, value: &OsStr) -> Result<CString> {
    CString::new(value.as_bytes()).map_err(|err| Error::nul_byte(what, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn test_command_line_from_values() {
        let command = CommandLine::from_values(vec!["/bin/echo", "hello", "-n"]).unwrap();

        assert_eq!(command.path(), OsStr::new("/bin/echo"));
        assert_eq!(
            command.args(),
            &[OsString::from("hello"), OsString::from("-n")]
        );
    }

    #[test]
    fn test_command_line_without_path_is_an_argument_error() {
        let result = CommandLine::from_values(Vec::<OsString>::new());

        assert_eq!(result, Err(Error::missing_path()));
        assert_eq!(result.unwrap_err().exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_image_argv_starts_with_path() {
        let command = CommandLine::new("/bin/echo", vec!["hello", "world"]);
        let env: Environment = vec![("LANG", "C")].into_iter().collect();
        let image = ProcessImage::new(&command, &env).unwrap();

        assert_eq!(image.path(), CString::new("/bin/echo").unwrap().as_c_str());
        assert_eq!(
            image.argv(),
            &[
                CString::new("/bin/echo").unwrap(),
                CString::new("hello").unwrap(),
                CString::new("world").unwrap(),
            ]
        );
        assert_eq!(image.envp(), &[CString::new("LANG=C").unwrap()]);
    }

    #[test]
    fn test_image_without_extra_args() {
        let command = CommandLine::new("/bin/true", Vec::<OsString>::new());
        let image = ProcessImage::new(&command, &Environment::default()).unwrap();

        assert_eq!(image.argv(), &[CString::new("/bin/true").unwrap()]);
        assert!(image.envp().is_empty());
    }

    #[test]
    fn test_image_keeps_non_utf8_arguments() {
        let raw = OsStr::from_bytes(b"caf\xe9");
        let command = CommandLine::new("/bin/true", vec![raw]);
        let image = ProcessImage::new(&command, &Environment::default()).unwrap();

        assert_eq!(image.argv()[1].as_bytes(), b"caf\xe9");
    }

    #[test]
    fn test_image_rejects_nul_bytes() {
        let command = CommandLine::new("/bin/true", vec!["a\0b"]);

        assert_eq!(
            ProcessImage::new(&command, &Environment::default()),
            Err(Error::Argument(
                "argument contains a nul byte at position 1".to_string()
            ))
        );
    }

    #[test]
    fn test_exec_failure_returns_error() {
        // execve fails before touching the current image, so this is safe to
        // call from the test process itself
        let command = CommandLine::new("/nonexistent/path", Vec::<OsString>::new());
        let image = ProcessImage::new(&command, &Environment::default()).unwrap();

        let error = image.exec();

        assert_eq!(
            error,
            Error::Exec(PathBuf::from("/nonexistent/path"), Errno::ENOENT)
        );
        assert_eq!(error.exit_code(), EXIT_EXEC_FAILURE);
    }
}
