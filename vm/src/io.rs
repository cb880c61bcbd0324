use std::io::{Read, Write};

/// Byte source for the `,` operation.
pub trait Input {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Byte sink for the `.` operation.
pub trait Output {
    fn write_byte(&mut self, value: u8);
}

/// Fixed input buffer, consumed front to back. Reads past the end return
/// `None` and leave the current cell untouched.
pub struct BufferInput {
    data: Vec<u8>,
    head: usize,
}

impl BufferInput {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            head: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

impl Input for BufferInput {
    fn read_byte(&mut self) -> Option<u8> {
        let b = self.data.get(self.head).copied();
        if b.is_some() {
            self.head += 1;
        }
        b
    }
}

/// Collects output bytes for inspection after a run.
#[derive(Default)]
pub struct BufferOutput {
    pub data: Vec<u8>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for BufferOutput {
    fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }
}

/// Adapts any `Read` to the machine's input, one byte at a time.
pub struct StreamInput<R: Read>(pub R);

impl<R: Read> Input for StreamInput<R> {
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.0.read_exact(&mut buf) {
            Ok(()) => Some(buf[0]),
            Err(_) => None,
        }
    }
}

/// Adapts any `Write` to the machine's output.
pub struct StreamOutput<W: Write>(pub W);

impl<W: Write> Output for StreamOutput<W> {
    fn write_byte(&mut self, value: u8) {
        let _ = self.0.write_all(&[value]);
    }
}
