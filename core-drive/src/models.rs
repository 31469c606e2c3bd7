use serde::Serialize;
use std::sync::Arc;

/// Progress callback for uploads and downloads: `(bytes_so_far, total_bytes)`.
///
/// `total_bytes` is zero when the remote store did not report a size.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// One folder in a tree returned by [`DriveFacade::folder_tree`](crate::DriveFacade::folder_tree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    /// `None` when the folder was not explored (depth limit or listing failure)
    pub children: Option<Vec<FolderNode>>,
}

impl FolderNode {
    pub fn is_explored(&self) -> bool {
        self.children.is_some()
    }

    /// Number of folders in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(FolderNode::count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_explored() {
        let tree = FolderNode {
            id: "root".into(),
            name: "Course".into(),
            children: Some(vec![
                FolderNode {
                    id: "w1".into(),
                    name: "Week 1".into(),
                    children: None,
                },
                FolderNode {
                    id: "w2".into(),
                    name: "Week 2".into(),
                    children: Some(vec![]),
                },
            ]),
        };

        assert_eq!(tree.count(), 3);
        assert!(tree.is_explored());
        assert!(!tree.children.as_ref().unwrap()[0].is_explored());
    }
}
