use crate::core::parse_timecode;
use crate::view::TabMode;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{command}: missing argument")]
    MissingArgument { command: &'static str },
    #[error("{command}: invalid argument '{value}'")]
    InvalidArgument { command: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoomRequest {
    Fit,
    Original,
    In,
    Out,
    Toggle(bool),
    Factor(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Open { frames: i32, fps: f64 },
    Play(f64),
    Pause,
    Stop,
    Toggle,
    Seek(i32),
    Rewind,
    FastForward,
    Next,
    Previous,
    In(i32),
    Out(i32),
    Markers(Vec<i32>),
    Volume(i32),
    Mute(bool),
    Zoom(ZoomRequest),
    Resize { width: u32, height: u32 },
    ScrollX(i32),
    ScrollY(i32),
    Tab(usize),
    EnableTab { tab: TabMode, enabled: bool },
    Screen(Option<usize>),
    Seekable(bool),
    Capture(bool),
    Wait(u64),
    Status,
    Help,
    Quit,
}

fn arg<'a>(
    args: &[&'a str],
    index: usize,
    command: &'static str,
) -> Result<&'a str, ParseCommandError> {
    args.get(index).copied().ok_or(ParseCommandError::MissingArgument { command })
}

fn number<T>(value: &str, command: &'static str) -> Result<T, ParseCommandError>
where
    T: std::str::FromStr,
{
    value.parse().map_err(|_| ParseCommandError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

fn position(value: &str, fps: f64, command: &'static str) -> Result<i32, ParseCommandError> {
    parse_timecode(value, fps).ok_or_else(|| ParseCommandError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

fn switch(value: &str, command: &'static str) -> Result<bool, ParseCommandError> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(ParseCommandError::InvalidArgument {
            command,
            value: value.to_string(),
        }),
    }
}

fn tab(value: &str, command: &'static str) -> Result<TabMode, ParseCommandError> {
    match value {
        "source" => Ok(TabMode::Source),
        "program" => Ok(TabMode::Program),
        _ => number::<usize>(value, command).and_then(|index| {
            TabMode::from_index(index).ok_or_else(|| ParseCommandError::InvalidArgument {
                command,
                value: value.to_string(),
            })
        }),
    }
}

impl ShellCommand {
    /// Parses one input line. Positions accept frames or `HH:MM:SS:FF` at `fps`.
    pub fn parse(line: &str, fps: f64) -> Result<Self, ParseCommandError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseCommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let command = match name {
            "open" => {
                let frames = number(arg(&args, 0, "open")?, "open")?;
                let fps = match args.get(1) {
                    Some(value) => number(value, "open")?,
                    None => 25.0,
                };
                ShellCommand::Open { frames, fps }
            }
            "play" => match args.first() {
                Some(value) => ShellCommand::Play(number(value, "play")?),
                None => ShellCommand::Play(1.0),
            },
            "pause" => ShellCommand::Pause,
            "stop" => ShellCommand::Stop,
            "toggle" | "space" => ShellCommand::Toggle,
            "seek" => ShellCommand::Seek(position(arg(&args, 0, "seek")?, fps, "seek")?),
            "rewind" | "j" => ShellCommand::Rewind,
            "ff" | "l" => ShellCommand::FastForward,
            "next" => ShellCommand::Next,
            "prev" => ShellCommand::Previous,
            "in" => ShellCommand::In(position(arg(&args, 0, "in")?, fps, "in")?),
            "out" => ShellCommand::Out(position(arg(&args, 0, "out")?, fps, "out")?),
            "markers" => {
                let markers = args
                    .iter()
                    .flat_map(|a| a.split(','))
                    .filter(|s| !s.is_empty())
                    .map(|s| position(s, fps, "markers"))
                    .collect::<Result<Vec<_>, _>>()?;
                ShellCommand::Markers(markers)
            }
            "volume" => ShellCommand::Volume(number(arg(&args, 0, "volume")?, "volume")?),
            "mute" => ShellCommand::Mute(true),
            "unmute" => ShellCommand::Mute(false),
            "zoom" => {
                let request = match arg(&args, 0, "zoom")? {
                    "fit" => ZoomRequest::Fit,
                    "original" | "100" => ZoomRequest::Original,
                    "in" => ZoomRequest::In,
                    "out" => ZoomRequest::Out,
                    "toggle" => ZoomRequest::Toggle(switch(arg(&args, 1, "zoom")?, "zoom")?),
                    value => ZoomRequest::Factor(number(value, "zoom")?),
                };
                ShellCommand::Zoom(request)
            }
            "resize" => ShellCommand::Resize {
                width: number(arg(&args, 0, "resize")?, "resize")?,
                height: number(arg(&args, 1, "resize")?, "resize")?,
            },
            "hscroll" => ShellCommand::ScrollX(number(arg(&args, 0, "hscroll")?, "hscroll")?),
            "vscroll" => ShellCommand::ScrollY(number(arg(&args, 0, "vscroll")?, "vscroll")?),
            "tab" => ShellCommand::Tab(tab(arg(&args, 0, "tab")?, "tab")?.index()),
            "enable-tab" => ShellCommand::EnableTab {
                tab: tab(arg(&args, 0, "enable-tab")?, "enable-tab")?,
                enabled: switch(arg(&args, 1, "enable-tab")?, "enable-tab")?,
            },
            "screen" => match args.first() {
                Some(value) => ShellCommand::Screen(Some(number(value, "screen")?)),
                None => ShellCommand::Screen(None),
            },
            "seekable" => ShellCommand::Seekable(switch(arg(&args, 0, "seekable")?, "seekable")?),
            "capture" => ShellCommand::Capture(switch(arg(&args, 0, "capture")?, "capture")?),
            "wait" => ShellCommand::Wait(number(arg(&args, 0, "wait")?, "wait")?),
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
