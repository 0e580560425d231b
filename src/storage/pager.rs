//! Owns the file handle and a fixed-capacity table of in-memory page frames.
//!
//! Pages are loaded from disk lazily, on first access, and kept resident
//! until `flush` writes them back. There is no eviction: the frame table's
//! capacity (`TABLE_MAX_PAGES`) is also the hard cap on database size.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::errors::Error;
use crate::storage::node::{PageBuf, PAGE_SIZE};

pub const TABLE_MAX_PAGES: usize = 100;

pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: heapless::Vec<Option<Box<PageBuf>>, TABLE_MAX_PAGES>,
}

impl Pager {
    pub fn open(path: &Path) -> Result<Pager, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let file_length = file.metadata()?.len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(Error::Storage(
                "database file is not a whole number of pages".into(),
            ));
        }

        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        let mut pages = heapless::Vec::new();
        for _ in 0..TABLE_MAX_PAGES {
            // heapless::Vec::push never fails while below capacity.
            let _ = pages.push(None);
        }

        debug!(?path, file_length, num_pages, "opened database file");
        Ok(Pager {
            file,
            file_length,
            num_pages,
            pages,
        })
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// The first page number past the end of the file. Pages are never
    /// reused once allocated (no deletion support).
    pub fn get_unused_page_num(&self) -> u32 {
        self.num_pages
    }

    /// Returns a reference to `page_num`, loading it from disk first if it
    /// isn't already resident. Pages past the current end of file (but
    /// within capacity) come back zero-filled, which is how new pages are
    /// allocated.
    pub fn get(&mut self, page_num: u32) -> Result<&PageBuf, Error> {
        self.load_if_needed(page_num)?;
        Ok(self.pages[page_num as usize].as_deref().unwrap())
    }

    pub fn get_mut(&mut self, page_num: u32) -> Result<&mut PageBuf, Error> {
        self.load_if_needed(page_num)?;
        Ok(self.pages[page_num as usize].as_deref_mut().unwrap())
    }

    fn load_if_needed(&mut self, page_num: u32) -> Result<(), Error> {
        if page_num as usize >= TABLE_MAX_PAGES {
            return Err(Error::Storage(format!(
                "page number {page_num} exceeds the {TABLE_MAX_PAGES}-page table limit"
            )));
        }

        if self.pages[page_num as usize].is_some() {
            return Ok(());
        }

        let mut buf = Box::new([0u8; PAGE_SIZE]);
        if page_num < self.num_pages {
            trace!(page_num, "loading page from disk");
            self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
            self.file.read_exact(buf.as_mut())?;
        }

        if page_num >= self.num_pages {
            self.num_pages = page_num + 1;
        }
        self.pages[page_num as usize] = Some(buf);
        Ok(())
    }

    /// Writes a single page back to disk at its slot. The caller is
    /// responsible for knowing the page is dirty; there's no dirty tracking.
    pub fn flush(&mut self, page_num: u32) -> Result<(), Error> {
        let page = self.pages[page_num as usize]
            .as_deref()
            .ok_or_else(|| Error::Storage(format!("cannot flush empty frame {page_num}")))?;

        self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(page)?;
        Ok(())
    }

    /// Flushes every resident page and syncs the file to disk.
    pub fn flush_all(&mut self) -> Result<(), Error> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
            }
        }
        self.file.sync_all()?;
        Ok(())
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }
}
