//! Folder tree building and breadcrumbs.

use std::sync::Arc;

use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;
use filedeck_database::TreeRepository;
use filedeck_entity::folder::{Folder, FolderNode};

use crate::context::RequestContext;

/// Builds folder trees and ancestor paths.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Tree persistence.
    repo: Arc<dyn TreeRepository>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(repo: Arc<dyn TreeRepository>) -> Self {
        Self { repo }
    }

    /// Builds the folder tree below `folder_id` as the caller may see it.
    ///
    /// Folders the caller cannot read are pruned with their subtrees.
    pub async fn get_tree(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<FolderNode> {
        let arena = self.repo.load_subtree(folder_id).await?;

        arena
            .node_readable_by(folder_id, ctx.owner_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Returns the chain of folders from the root down to `folder_id`.
    ///
    /// The chain starts below the nearest ancestor the caller cannot read,
    /// so a reader of a public folder never sees its private parents.
    pub async fn breadcrumbs(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let chain = self.repo.ancestors(folder_id).await?;

        let mut visible: Vec<Folder> = chain
            .into_iter()
            .take_while(|folder| folder.is_readable_by(ctx.owner_id))
            .collect();
        if visible.is_empty() {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }

        visible.reverse();
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedeck_core::error::ErrorKind;

    use crate::folder::CreateFolderRequest;
    use crate::test_support::Harness;

    #[tokio::test]
    async fn test_breadcrumbs_root_first() {
        let h = Harness::new().await;
        let a = h.mkdir("A", None).await;
        let b = h.mkdir("B", Some(a.id)).await;
        let c = h.mkdir("C", Some(b.id)).await;

        let crumbs = h.tree.breadcrumbs(&h.ctx, c.id).await.unwrap();
        let names: Vec<&str> = crumbs.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let err = h.tree.breadcrumbs(&h.other, c.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_tree_counts() {
        let h = Harness::new().await;
        let a = h.mkdir("A", None).await;
        let b = h.mkdir("B", Some(a.id)).await;
        h.mkdir("C", Some(a.id)).await;
        h.upload(Some(b.id), "x.txt", "x").await;

        let node = h.tree.get_tree(&h.ctx, a.id).await.unwrap();
        assert_eq!(node.child_count, 2);
        assert_eq!(node.file_count, 0);
        assert_eq!(node.children[0].name, "B");
        assert_eq!(node.children[0].file_count, 1);
        assert_eq!(node.children[0].depth, 1);
    }

    #[tokio::test]
    async fn test_tree_of_public_folder_for_other_owner() {
        let h = Harness::new().await;
        let shared = h
            .folders
            .create_folder(
                &h.ctx,
                CreateFolderRequest {
                    name: "Shared".into(),
                    parent_id: None,
                    is_public: true,
                },
            )
            .await
            .unwrap();

        assert!(h.tree.get_tree(&h.other, shared.id).await.is_ok());
        let err = h.tree.get_tree(&h.ctx, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_public_folder_under_private_parent_hides_private_neighbours() {
        let h = Harness::new().await;
        let secret_root = h.mkdir("SecretRoot", None).await;
        let shared = h
            .folders
            .create_folder(
                &h.ctx,
                CreateFolderRequest {
                    name: "Shared".into(),
                    parent_id: Some(secret_root.id),
                    is_public: true,
                },
            )
            .await
            .unwrap();
        h.mkdir("HiddenChild", Some(shared.id)).await;

        let node = h.tree.get_tree(&h.other, shared.id).await.unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.child_count, 0);

        let crumbs = h.tree.breadcrumbs(&h.other, shared.id).await.unwrap();
        let names: Vec<&str> = crumbs.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Shared"]);

        // The owner still sees everything.
        let node = h.tree.get_tree(&h.ctx, shared.id).await.unwrap();
        assert_eq!(node.children[0].name, "HiddenChild");
        let crumbs = h.tree.breadcrumbs(&h.ctx, shared.id).await.unwrap();
        assert_eq!(crumbs.len(), 2);
    }
}
