use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use tokio::process::Command;

use super::FFmpegError;

#[derive(Debug)]
pub(crate) enum StdIo {
    Null,
    Inherit,
}

impl StdIo {
    fn into_exec(self) -> std::process::Stdio {
        match self {
            StdIo::Null => std::process::Stdio::null(),
            StdIo::Inherit => std::process::Stdio::inherit(),
        }
    }
}

/// A command line argument.
///
/// `Generated` arguments are produced at runtime (random file names, temp
/// paths) and are shown by their label in [`FFmpegCommand::test_display`] so
/// command lines can be asserted in tests.
#[derive(Debug)]
pub(crate) enum FFmpegArg {
    Plain(OsString),
    Generated { label: OsString, value: OsString },
}

impl FFmpegArg {
    pub(crate) fn plain<S: Into<OsString>>(s: S) -> FFmpegArg {
        FFmpegArg::Plain(s.into())
    }
    pub(crate) fn generated<L: Into<OsString>, S: Into<OsString>>(label: L, s: S) -> FFmpegArg {
        FFmpegArg::Generated {
            label: label.into(),
            value: s.into(),
        }
    }
    fn as_exec(&self) -> &OsStr {
        match self {
            FFmpegArg::Plain(s) => s.as_os_str(),
            FFmpegArg::Generated { value, .. } => value.as_os_str(),
        }
    }
    fn as_test(&self) -> &OsStr {
        match self {
            FFmpegArg::Plain(s) => s.as_os_str(),
            FFmpegArg::Generated { label, .. } => label.as_os_str(),
        }
    }
}

struct TestArgFormat<'a>(&'a FFmpegArg);

impl<'a> std::fmt::Debug for TestArgFormat<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0.as_test())
    }
}

/// Which ffmpeg to run. Defaults to whatever `ffmpeg` resolves to on `PATH`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FFMpegBinary {
    path: Option<PathBuf>,
}

impl From<Option<PathBuf>> for FFMpegBinary {
    fn from(path: Option<PathBuf>) -> Self {
        FFMpegBinary { path }
    }
}

impl FFMpegBinary {
    pub fn new<P: Into<PathBuf>>(p: P) -> FFMpegBinary {
        FFMpegBinary {
            path: Some(p.into()),
        }
    }

    pub fn executable_path(&self) -> &Path {
        if let Some(p) = &self.path {
            p.as_path()
        } else {
            Path::new("ffmpeg")
        }
    }

    pub(crate) fn build_command(&self) -> FFmpegCommand {
        FFmpegCommand {
            bin: self.clone(),
            ..Default::default()
        }
    }

    /// Run `ffmpeg -version` to make sure the binary exists and starts.
    pub async fn check_available(&self) -> Result<(), FFmpegError> {
        let mut cmd = self.build_command();
        cmd.arg("-hide_banner");
        cmd.arg("-version");
        cmd.run().await.map_err(|e| match e {
            FFmpegError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                FFmpegError::NotInstalled(self.executable_path().to_path_buf())
            }
            e => e,
        })
    }
}

/// Low level interface over calling ffmpeg
#[derive(Debug, Default)]
pub(crate) struct FFmpegCommand {
    pub(crate) bin: FFMpegBinary,
    pub(crate) args: Vec<FFmpegArg>,
}

pub(crate) struct TestFormat<'a>(&'a FFmpegCommand);

impl<'a> std::fmt::Debug for TestFormat<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self.0.args.iter().map(TestArgFormat).collect::<Vec<_>>();
        f.debug_struct("FFMpegTestFormat")
            .field("bin", &self.0.bin.executable_path())
            .field("args", &args)
            .finish()
    }
}

impl FFmpegCommand {
    pub(crate) fn test_display(&self) -> TestFormat<'_> {
        TestFormat(self)
    }

    pub(crate) fn arg<S: Into<OsString>>(&mut self, s: S) -> &mut Self {
        self.args.push(FFmpegArg::plain(s));
        self
    }

    pub(crate) fn generated_arg<L: Into<OsString>, S: Into<OsString>>(
        &mut self,
        label: L,
        s: S,
    ) -> &mut Self {
        self.args.push(FFmpegArg::generated(label, s));
        self
    }

    fn command(&self) -> Command {
        let mut st = Command::new(self.bin.executable_path());
        st.args(self.args.iter().map(FFmpegArg::as_exec));
        st.stdin(StdIo::Null.into_exec());
        st.stdout(StdIo::Null.into_exec());

        if cfg!(feature = "ffmpeg-debug") {
            st.stderr(StdIo::Inherit.into_exec());
        } else {
            st.stderr(StdIo::Null.into_exec());
        }
        st
    }

    /// Run to completion, a non-zero exit is an error.
    pub(crate) async fn run(self) -> Result<(), FFmpegError> {
        log::trace!("run {:?}", self.test_display());
        let status = self.command().status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(FFmpegError::Exit(status.code().unwrap_or(-1)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binary_is_on_path() {
        assert_eq!(
            FFMpegBinary::default().executable_path(),
            Path::new("ffmpeg")
        );
        assert_eq!(
            FFMpegBinary::new("/opt/ffmpeg/bin/ffmpeg").executable_path(),
            Path::new("/opt/ffmpeg/bin/ffmpeg")
        );
    }

    #[test]
    fn generated_args_show_their_label() {
        let mut cmd = FFMpegBinary::default().build_command();
        cmd.arg("-i")
            .generated_arg("input", "/tmp/7f3a.mp4")
            .arg("-y");
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r#"FFMpegTestFormat { bin: "ffmpeg", args: ["-i", "input", "-y"] }"#
        );
        let exec = cmd.args.iter().map(FFmpegArg::as_exec).collect::<Vec<_>>();
        assert_eq!(exec[1], OsStr::new("/tmp/7f3a.mp4"));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let bin = FFMpegBinary::new("/definitely/not/a/real/ffmpeg");
        match bin.check_available().await {
            Err(FFmpegError::NotInstalled(p)) => {
                assert_eq!(p, PathBuf::from("/definitely/not/a/real/ffmpeg"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
