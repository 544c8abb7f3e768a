//! Folder tree structures and the algorithms that keep the hierarchy acyclic.
//!
//! The hierarchy is a forest of single-parent links. Every check that could
//! involve a cycle reduces to walking the ancestor chain of one node, so the
//! functions here are iterative and bounded by the number of known folders.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use super::model::Folder;
use crate::file::File;

/// A node in a folder tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Depth relative to the node the tree was built from.
    pub depth: u32,
    /// Number of child folders.
    pub child_count: u64,
    /// Number of files directly in this folder.
    pub file_count: u64,
    /// Child folder nodes, sorted by name.
    pub children: Vec<FolderNode>,
}

/// Everything below a folder, excluding the folder itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subtree {
    /// Descendant folders in breadth-first order.
    pub folders: Vec<Uuid>,
    /// Files in the folder or any descendant.
    pub files: Vec<Uuid>,
}

impl Subtree {
    /// Descendant folders ordered so that children always precede parents.
    pub fn folders_deepest_first(&self) -> impl Iterator<Item = &Uuid> {
        self.folders.iter().rev()
    }

    /// Whether there is nothing below the folder.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Walk parent links upward from `start`.
///
/// Returns the chain nearest-first, starting with `start` itself and ending
/// at a root-level folder (or at the first id `parent_of` cannot resolve).
/// A chain longer than `max_len` can only come from a corrupted hierarchy
/// and is reported as an internal error.
pub fn ancestor_chain<F>(start: Uuid, max_len: usize, mut parent_of: F) -> AppResult<Vec<Uuid>>
where
    F: FnMut(Uuid) -> Option<Option<Uuid>>,
{
    let mut chain = vec![start];
    let mut current = start;

    while let Some(Some(parent)) = parent_of(current) {
        if chain.len() >= max_len {
            return Err(AppError::internal(format!(
                "Folder hierarchy above {start} does not terminate"
            )));
        }
        chain.push(parent);
        current = parent;
    }

    Ok(chain)
}

/// Reject a move of `folder_id` under the folder whose ancestor chain is
/// `target_chain` (as returned by [`ancestor_chain`]).
pub fn check_reparent(folder_id: Uuid, target_chain: &[Uuid]) -> AppResult<()> {
    match target_chain.first() {
        Some(target) if *target == folder_id => Err(AppError::invalid_operation(
            "Cannot move a folder into itself",
        )),
        Some(_) if target_chain.contains(&folder_id) => Err(AppError::invalid_operation(
            "Cannot move a folder into its own descendant",
        )),
        _ => Ok(()),
    }
}

/// An arena holding a folder/file graph keyed by id, with parent → children
/// indices for both folders and files.
#[derive(Debug, Clone, Default)]
pub struct TreeArena {
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
    child_folders: HashMap<Option<Uuid>, HashSet<Uuid>>,
    child_files: HashMap<Option<Uuid>, HashSet<Uuid>>,
}

impl TreeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from flat record lists.
    pub fn from_records(
        folders: impl IntoIterator<Item = Folder>,
        files: impl IntoIterator<Item = File>,
    ) -> Self {
        let mut arena = Self::new();
        for folder in folders {
            arena.insert_folder(folder);
        }
        for file in files {
            arena.insert_file(file);
        }
        arena
    }

    /// Look up a folder.
    pub fn folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Look up a file.
    pub fn file(&self, id: Uuid) -> Option<&File> {
        self.files.get(&id)
    }

    /// Number of folders held.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of files held.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Iterate over every folder.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    /// Iterate over every file.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    /// Insert or replace a folder, keeping the child index in sync.
    pub fn insert_folder(&mut self, folder: Folder) -> Option<Folder> {
        let previous = self.folders.insert(folder.id, folder.clone());
        if let Some(prev) = &previous {
            unlink(&mut self.child_folders, prev.parent_id, prev.id);
        }
        self.child_folders
            .entry(folder.parent_id)
            .or_default()
            .insert(folder.id);
        previous
    }

    /// Insert or replace a file, keeping the child index in sync.
    pub fn insert_file(&mut self, file: File) -> Option<File> {
        let previous = self.files.insert(file.id, file.clone());
        if let Some(prev) = &previous {
            unlink(&mut self.child_files, prev.folder_id, prev.id);
        }
        self.child_files
            .entry(file.folder_id)
            .or_default()
            .insert(file.id);
        previous
    }

    /// Remove a single folder record. Children are left in place.
    pub fn remove_folder(&mut self, id: Uuid) -> Option<Folder> {
        let folder = self.folders.remove(&id)?;
        unlink(&mut self.child_folders, folder.parent_id, id);
        Some(folder)
    }

    /// Remove a single file record.
    pub fn remove_file(&mut self, id: Uuid) -> Option<File> {
        let file = self.files.remove(&id)?;
        unlink(&mut self.child_files, file.folder_id, id);
        Some(file)
    }

    /// Direct child folders of `parent`, sorted by name.
    pub fn subfolders(&self, parent: Option<Uuid>) -> Vec<&Folder> {
        let mut folders: Vec<&Folder> = self
            .child_folders
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.folders.get(id))
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        folders
    }

    /// Files directly in `parent`, newest first.
    pub fn files_in(&self, parent: Option<Uuid>) -> Vec<&File> {
        let mut files: Vec<&File> = self
            .child_files
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.files.get(id))
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        files
    }

    /// Direct (subfolder, file) counts of a folder.
    pub fn direct_counts(&self, id: Uuid) -> (u64, u64) {
        let count = |index: &HashMap<Option<Uuid>, HashSet<Uuid>>| {
            index.get(&Some(id)).map_or(0, |c| c.len() as u64)
        };
        (count(&self.child_folders), count(&self.child_files))
    }

    /// Whether a sibling folder of the same owner already uses `name`.
    pub fn sibling_name_taken(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        self.child_folders
            .get(&parent_id)
            .into_iter()
            .flatten()
            .filter(|id| Some(**id) != exclude)
            .filter_map(|id| self.folders.get(id))
            .any(|f| f.owner_id == owner_id && f.name == name)
    }

    /// Ancestor chain of a folder, nearest first, starting with the folder.
    pub fn ancestors(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        ancestor_chain(id, self.folders.len() + 1, |current| {
            self.folders.get(&current).map(|f| f.parent_id)
        })
    }

    /// Collect everything below a folder without recursion.
    pub fn subtree(&self, id: Uuid) -> Subtree {
        let mut subtree = Subtree::default();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            if let Some(files) = self.child_files.get(&Some(current)) {
                subtree.files.extend(files.iter().copied());
            }
            for child in self.child_folders.get(&Some(current)).into_iter().flatten() {
                if seen.insert(*child) {
                    subtree.folders.push(*child);
                    queue.push_back(*child);
                }
            }
        }

        subtree
    }

    /// Build a [`FolderNode`] tree rooted at `id`.
    pub fn node(&self, id: Uuid) -> Option<FolderNode> {
        self.node_where(id, |_| true, |_| true)
    }

    /// Build the tree rooted at `id` as `owner_id` may see it.
    ///
    /// Unreadable folders are pruned along with everything below them, and
    /// unreadable files are left out of `file_count`.
    pub fn node_readable_by(&self, id: Uuid, owner_id: Uuid) -> Option<FolderNode> {
        self.node_where(
            id,
            |folder| folder.is_readable_by(owner_id),
            |file| file.is_readable_by(owner_id),
        )
    }

    /// Build the tree rooted at `id`, keeping only folders that pass
    /// `keep_folder` and counting only files that pass `keep_file`.
    ///
    /// A folder that is not kept hides its whole subtree. Returns `None`
    /// when `id` is unknown or is itself not kept.
    pub fn node_where<F, G>(&self, id: Uuid, keep_folder: F, keep_file: G) -> Option<FolderNode>
    where
        F: Fn(&Folder) -> bool,
        G: Fn(&File) -> bool,
    {
        if !keep_folder(self.folders.get(&id)?) {
            return None;
        }

        let subtree = self.subtree(id);
        let mut depth = HashMap::from([(id, 0u32)]);
        for folder_id in &subtree.folders {
            let parent_depth = self.folders[folder_id]
                .parent_id
                .and_then(|p| depth.get(&p).copied())
                .unwrap_or(0);
            depth.insert(*folder_id, parent_depth + 1);
        }

        let mut built: HashMap<Uuid, FolderNode> = HashMap::new();
        for folder_id in subtree.folders_deepest_first().chain(std::iter::once(&id)) {
            let folder = &self.folders[folder_id];
            if !keep_folder(folder) {
                continue;
            }
            let children: Vec<FolderNode> = self
                .subfolders(Some(*folder_id))
                .into_iter()
                .filter_map(|child| built.remove(&child.id))
                .collect();
            let file_count = self
                .files_in(Some(*folder_id))
                .into_iter()
                .filter(|file| keep_file(*file))
                .count() as u64;
            built.insert(
                *folder_id,
                FolderNode {
                    id: folder.id,
                    name: folder.name.clone(),
                    depth: depth.get(folder_id).copied().unwrap_or(0),
                    child_count: children.len() as u64,
                    file_count,
                    children,
                },
            );
        }

        built.remove(&id)
    }
}

fn unlink(index: &mut HashMap<Option<Uuid>, HashSet<Uuid>>, parent: Option<Uuid>, id: Uuid) {
    if let Some(children) = index.get_mut(&parent) {
        children.remove(&id);
        if children.is_empty() {
            index.remove(&parent);
        }
    }
}
