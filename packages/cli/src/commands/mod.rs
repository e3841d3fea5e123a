pub mod lint;
pub mod render;

pub use lint::{lint, LintArgs};
pub use render::{render, RenderArgs};

use a2ui_interpreter::{MessageProcessor, ProcessError, ProcessorOptions};
use a2ui_protocol::{ServerMessage, StreamError, StreamItem, StreamParser, DEFAULT_SURFACE_ID};
use std::io::{ErrorKind, Read};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub default_surface_id: String,
    pub processor: ProcessorOptions,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            default_surface_id: DEFAULT_SURFACE_ID.to_string(),
            processor: ProcessorOptions::default(),
        }
    }
}

/// Outcome of feeding one stream through the interpreter
#[derive(Debug)]
pub struct StreamRun {
    pub processor: MessageProcessor,
    pub stream_errors: Vec<StreamError>,
    pub process_errors: Vec<ProcessError>,
    pub messages: usize,
}

impl StreamRun {
    fn apply(&mut self, items: Vec<StreamItem>, default_surface_id: &str) {
        for item in items {
            match item {
                Ok(message) => {
                    self.messages += 1;
                    let message = route(message, default_surface_id);
                    self.process_errors.extend(self.processor.process_message(message));
                }
                Err(err) => self.stream_errors.push(err),
            }
        }
    }

    pub fn problem_count(&self) -> usize {
        self.stream_errors.len() + self.process_errors.len()
    }
}

/// Read `reader` chunk by chunk through the NDJSON parser into a fresh processor
pub fn run_stream<R: Read>(mut reader: R, options: &StreamOptions) -> anyhow::Result<StreamRun> {
    let mut parser = StreamParser::new();
    let mut run = StreamRun {
        processor: MessageProcessor::with_options(options.processor.clone()),
        stream_errors: Vec::new(),
        process_errors: Vec::new(),
        messages: 0,
    };

    let mut buf = [0u8; READ_CHUNK];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        let items = parser.feed(&buf[..read]);
        run.apply(items, &options.default_surface_id);
    }
    let items = parser.finish();
    run.apply(items, &options.default_surface_id);

    Ok(run)
}

/// Send messages that named no surface to `default_surface_id`
fn route(mut message: ServerMessage, default_surface_id: &str) -> ServerMessage {
    if default_surface_id == DEFAULT_SURFACE_ID {
        return message;
    }

    match &mut message {
        ServerMessage::BeginRendering(m) => retarget(&mut m.surface_id, default_surface_id),
        ServerMessage::SurfaceUpdate(m) => retarget(&mut m.surface_id, default_surface_id),
        ServerMessage::DataModelUpdate(m) => retarget(&mut m.surface_id, default_surface_id),
        ServerMessage::DeleteSurface(m) => retarget(&mut m.surface_id, default_surface_id),
        ServerMessage::Unknown { .. } => {}
    }
    message
}

fn retarget(surface_id: &mut String, default_surface_id: &str) {
    if *surface_id == DEFAULT_SURFACE_ID {
        *surface_id = default_surface_id.to_string();
    }
}
