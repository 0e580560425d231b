//! The fixed three-column row and its raw, contiguous on-disk layout.

use crate::errors::Error;

pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;

const ID_OFFSET: usize = 0;
const ID_SIZE: usize = 4;
const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

/// Total serialized size of a row: 4 (id) + 32 (username) + 255 (email).
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    /// Builds a row from parsed `insert` arguments, rejecting strings that
    /// would not fit their fixed-width slot.
    pub fn new(id: u32, username: String, email: String) -> Result<Row, Error> {
        if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
            return Err(Error::StringTooLong);
        }
        Ok(Row { id, username, email })
    }

    /// Writes the row as 291 raw bytes: little-endian id, then each string
    /// left-aligned in its slot with the remainder zero-filled.
    pub fn serialize(&self, dest: &mut [u8]) {
        debug_assert_eq!(dest.len(), ROW_SIZE);
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());

        let username_slot = &mut dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE];
        username_slot.fill(0);
        username_slot[..self.username.len()].copy_from_slice(self.username.as_bytes());

        let email_slot = &mut dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE];
        email_slot.fill(0);
        email_slot[..self.email.len()].copy_from_slice(self.email.as_bytes());
    }

    /// Reads a row back out of 291 raw bytes, stopping each string at its
    /// first NUL byte (or the slot's end, if none is present).
    pub fn deserialize(src: &[u8]) -> Row {
        debug_assert_eq!(src.len(), ROW_SIZE);
        let id = u32::from_le_bytes(src[ID_OFFSET..ID_OFFSET + ID_SIZE].try_into().unwrap());
        let username = read_nul_terminated(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        let email = read_nul_terminated(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);
        Row { id, username, email }
    }
}

fn read_nul_terminated(slot: &[u8]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..end]).into_owned()
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}
