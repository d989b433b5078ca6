use crate::error::{Error, Result};

use serde::Serialize;
use serde_json::{Map, Value};

use std::io::{Read, Write};

/// Default maximum accepted body size (1 MiB)
pub const DEFAULT_MAX_INPUT: u32 = 1024 * 1024;

const LENGTH_PREFIX_SIZE: usize = 4;

/// Framed JSON channel over an input and an output stream
pub struct NativeMessaging<R, W> {
    reader: R,
    writer: W,
    max_input: u32,
}

impl<R: Read, W: Write> NativeMessaging<R, W> {
    /// Create a channel with the default input limit
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_input: DEFAULT_MAX_INPUT,
        }
    }

    /// Override the maximum accepted body size
    pub fn with_max_input(mut self, max_input: u32) -> Self {
        self.max_input = max_input;
        self
    }

    pub fn max_input(&self) -> u32 {
        self.max_input
    }

    /// Read one length-prefixed JSON object.
    ///
    /// The length is checked against the limit before any body bytes are read.
    pub fn receive_message(&mut self) -> Result<Map<String, Value>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.reader.read_exact(&mut prefix)?;
        let declared = u32::from_le_bytes(prefix);

        if declared > self.max_input {
            return Err(Error::InputTooLarge {
                declared,
                max: self.max_input,
            });
        }

        let mut body = vec![0u8; declared as usize];
        self.reader.read_exact(&mut body)?;
        log::debug!("received {} byte message", declared);

        match serde_json::from_slice(&body).map_err(Error::MalformedJson)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::NotAnObject),
        }
    }

    /// Serialize `message` and write it with its length prefix
    pub fn send_message<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let body = serde_json::to_vec(message).map_err(Error::Encode)?;
        let len = u32::try_from(body.len()).map_err(|_| Error::OutputTooLarge(body.len()))?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&body)?;
        self.writer.flush()?;
        log::debug!("sent {} byte message", len);
        Ok(())
    }

    /// Give back the underlying streams
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
