//! Real named pipes for end-to-end receive tests

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Create a FIFO at `path`
pub fn make_fifo(path: &Path) {
    let c_path = CString::new(path.as_os_str().as_bytes()).expect("path without NUL");
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    assert_eq!(rc, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}

/// Writer end of a FIFO that already has a reader attached
pub struct FifoWriter {
    file: File,
}

impl FifoWriter {
    /// Open the write end. The bridge must already hold the read end open.
    pub fn open(path: &Path) -> Self {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .expect("open fifo for writing");
        Self { file }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.file.write_all(bytes).expect("write fifo");
        self.file.flush().expect("flush fifo");
    }
}
