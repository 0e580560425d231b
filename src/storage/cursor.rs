//! A positional handle into the table: `(page_num, cell_num, end_of_table)`.
//!
//! A cursor borrows the table mutably for its whole lifetime. Any insert
//! that splits or relocates cells invalidates outstanding cursors -- callers
//! are expected to re-find rather than reuse one across an insert.

use crate::errors::Error;
use crate::storage::node::{self, NodeType};
use crate::storage::table::Table;

pub struct Cursor<'a> {
    pub table: &'a mut Table,
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

impl<'a> Cursor<'a> {
    /// Positions at the table's first row.
    ///
    /// Reads the leaf-header `num_cells` field at the root page regardless
    /// of the root's actual node type (see `node::max_key` for why that's
    /// safe after a root promotion but doesn't descend into the tree).
    pub fn start(table: &'a mut Table) -> Result<Cursor<'a>, Error> {
        let root_page_num = table.root_page_num;
        let root = table.pager.get(root_page_num)?;
        let num_cells = node::leaf_num_cells(root);
        Ok(Cursor {
            table,
            page_num: root_page_num,
            cell_num: 0,
            end_of_table: num_cells == 0,
        })
    }

    /// Locates the cursor position for `key`: the cell holding it if present,
    /// otherwise the cell it would be inserted at.
    ///
    /// Internal nodes never split in this crate (see the btree module), so
    /// the tree is at most two levels deep: a leaf root, or an internal root
    /// whose children are always leaves. One level of child lookup is
    /// therefore enough; there is no general recursive descent.
    pub fn find(table: &'a mut Table, key: u32) -> Result<Cursor<'a>, Error> {
        let root_page_num = table.root_page_num;
        let root = table.pager.get(root_page_num)?;
        match node::node_type(root) {
            NodeType::Leaf => Cursor::leaf_find(table, root_page_num, key),
            NodeType::Internal => {
                let child_page_num = Self::internal_find_child_page(root, key);
                Cursor::leaf_find(table, child_page_num, key)
            }
        }
    }

    fn internal_find_child_page(page: &crate::storage::node::PageBuf, key: u32) -> u32 {
        let num_keys = node::internal_num_keys(page);
        let mut min_index = 0u32;
        let mut max_index = num_keys;
        while min_index != max_index {
            let index = (min_index + max_index) / 2;
            let key_to_right = node::internal_key(page, index);
            if key_to_right >= key {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        node::internal_child(page, min_index)
    }

    fn leaf_find(table: &'a mut Table, page_num: u32, key: u32) -> Result<Cursor<'a>, Error> {
        let page = table.pager.get(page_num)?;
        let num_cells = node::leaf_num_cells(page);

        let mut min_index = 0u32;
        let mut one_past_max = num_cells;
        while one_past_max != min_index {
            let index = (min_index + one_past_max) / 2;
            let key_at_index = node::leaf_key(page, index);
            if key == key_at_index {
                min_index = index;
                break;
            }
            if key < key_at_index {
                one_past_max = index;
            } else {
                min_index = index + 1;
            }
        }

        Ok(Cursor {
            table,
            page_num,
            cell_num: min_index,
            end_of_table: false,
        })
    }

    pub fn value(&mut self) -> Result<&[u8], Error> {
        let page = self.table.pager.get(self.page_num)?;
        Ok(node::leaf_value(page, self.cell_num))
    }

    pub fn advance(&mut self) -> Result<(), Error> {
        let page = self.table.pager.get(self.page_num)?;
        self.cell_num += 1;
        if self.cell_num >= node::leaf_num_cells(page) {
            self.end_of_table = true;
        }
        Ok(())
    }
}
