//! Dataset access decisions
//!
//! [`decide`] is a pure, total function: callers fetch the dataset and
//! project state first, then evaluate the gate without touching storage.
//! The same gate backs both the read path (downloads, version listings)
//! and the write path (new version uploads).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The requesting identity, as asserted by the fronting auth proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    Anonymous,
    User { id: Uuid, is_staff: bool },
}

impl Principal {
    pub fn user(id: Uuid) -> Self {
        Self::User { id, is_staff: false }
    }

    pub fn staff(id: Uuid) -> Self {
        Self::User { id, is_staff: true }
    }

    /// User id when authenticated
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::User { id, .. } => Some(*id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::User { is_staff: true, .. })
    }
}

/// Role of a collaborator on a research project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Viewer,
    Contributor,
    Manager,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Viewer => "viewer",
            CollaboratorRole::Contributor => "contributor",
            CollaboratorRole::Manager => "manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "viewer" => Some(CollaboratorRole::Viewer),
            "contributor" => Some(CollaboratorRole::Contributor),
            "manager" => Some(CollaboratorRole::Manager),
            _ => None,
        }
    }
}

/// Outcome of an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    NoAccess,
    ReadOnly,
    ReadWrite,
}

impl AccessLevel {
    pub fn can_read(&self) -> bool {
        !matches!(self, AccessLevel::NoAccess)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, AccessLevel::ReadWrite)
    }
}

/// The dataset state the gate inspects
#[derive(Debug, Clone, Copy)]
pub struct DatasetVisibility {
    pub owner: Uuid,
    pub is_public: bool,
}

/// Owning-project state, when the dataset belongs to one
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub head_researcher: Uuid,
    pub is_public: bool,
    pub collaborators: Vec<(Uuid, CollaboratorRole)>,
}

impl ProjectContext {
    fn role_of(&self, user: Uuid) -> Option<CollaboratorRole> {
        self.collaborators
            .iter()
            .find(|(id, _)| *id == user)
            .map(|(_, role)| *role)
    }
}

/// Resolve the access level for `principal` on a dataset.
///
/// First matching rule wins:
/// 1. Staff principals get read-write.
/// 2. The dataset owner gets read-write.
/// 3. The head researcher of the owning project gets read-write.
/// 4. A public dataset (or one in a public project) is readable by anyone.
/// 5. Project collaborators get read-write (contributor, manager) or
///    read-only (viewer).
/// 6. Everyone else gets no access.
pub fn decide(
    principal: &Principal,
    dataset: &DatasetVisibility,
    project: Option<&ProjectContext>,
) -> AccessLevel {
    if principal.is_staff() {
        return AccessLevel::ReadWrite;
    }

    if let Some(user) = principal.user_id() {
        if user == dataset.owner {
            return AccessLevel::ReadWrite;
        }
        if let Some(project) = project {
            if user == project.head_researcher {
                return AccessLevel::ReadWrite;
            }
        }
    }

    if dataset.is_public || project.is_some_and(|p| p.is_public) {
        return AccessLevel::ReadOnly;
    }

    if let (Some(user), Some(project)) = (principal.user_id(), project) {
        match project.role_of(user) {
            Some(CollaboratorRole::Contributor) | Some(CollaboratorRole::Manager) => {
                return AccessLevel::ReadWrite;
            },
            Some(CollaboratorRole::Viewer) => return AccessLevel::ReadOnly,
            None => {},
        }
    }

    AccessLevel::NoAccess
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(owner: Uuid, is_public: bool) -> DatasetVisibility {
        DatasetVisibility { owner, is_public }
    }

    #[test]
    fn test_staff_always_read_write() {
        let owner = Uuid::new_v4();
        let staff = Principal::staff(Uuid::new_v4());
        let level = decide(&staff, &dataset(owner, false), None);
        assert_eq!(level, AccessLevel::ReadWrite);
    }

    #[test]
    fn test_owner_read_write() {
        let owner = Uuid::new_v4();
        let level = decide(&Principal::user(owner), &dataset(owner, false), None);
        assert_eq!(level, AccessLevel::ReadWrite);
    }

    #[test]
    fn test_anonymous_private_no_access() {
        let level = decide(&Principal::Anonymous, &dataset(Uuid::new_v4(), false), None);
        assert_eq!(level, AccessLevel::NoAccess);
    }

    #[test]
    fn test_anonymous_public_read_only() {
        let level = decide(&Principal::Anonymous, &dataset(Uuid::new_v4(), true), None);
        assert_eq!(level, AccessLevel::ReadOnly);
    }

    #[test]
    fn test_public_project_grants_read() {
        let project = ProjectContext {
            head_researcher: Uuid::new_v4(),
            is_public: true,
            collaborators: vec![],
        };
        let level = decide(
            &Principal::user(Uuid::new_v4()),
            &dataset(Uuid::new_v4(), false),
            Some(&project),
        );
        assert_eq!(level, AccessLevel::ReadOnly);
    }

    #[test]
    fn test_project_head_read_write() {
        let head = Uuid::new_v4();
        let project = ProjectContext {
            head_researcher: head,
            is_public: false,
            collaborators: vec![],
        };
        let level = decide(
            &Principal::user(head),
            &dataset(Uuid::new_v4(), false),
            Some(&project),
        );
        assert_eq!(level, AccessLevel::ReadWrite);
    }

    #[test]
    fn test_collaborator_roles() {
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let contributor = Uuid::new_v4();
        let manager = Uuid::new_v4();
        let project = ProjectContext {
            head_researcher: Uuid::new_v4(),
            is_public: false,
            collaborators: vec![
                (viewer, CollaboratorRole::Viewer),
                (contributor, CollaboratorRole::Contributor),
                (manager, CollaboratorRole::Manager),
            ],
        };
        let data = dataset(owner, false);

        assert_eq!(decide(&Principal::user(viewer), &data, Some(&project)), AccessLevel::ReadOnly);
        assert_eq!(
            decide(&Principal::user(contributor), &data, Some(&project)),
            AccessLevel::ReadWrite
        );
        assert_eq!(
            decide(&Principal::user(manager), &data, Some(&project)),
            AccessLevel::ReadWrite
        );
    }

    #[test]
    fn test_unrelated_user_no_access() {
        let project = ProjectContext {
            head_researcher: Uuid::new_v4(),
            is_public: false,
            collaborators: vec![(Uuid::new_v4(), CollaboratorRole::Manager)],
        };
        let level = decide(
            &Principal::user(Uuid::new_v4()),
            &dataset(Uuid::new_v4(), false),
            Some(&project),
        );
        assert_eq!(level, AccessLevel::NoAccess);
    }

    #[test]
    fn test_public_dataset_never_no_access() {
        // Exhaustive over principal shapes and project contexts: a public
        // dataset must always be at least readable.
        let owner = Uuid::new_v4();
        let data = dataset(owner, true);
        let head = Uuid::new_v4();
        let collaborator = Uuid::new_v4();
        let project = ProjectContext {
            head_researcher: head,
            is_public: false,
            collaborators: vec![(collaborator, CollaboratorRole::Viewer)],
        };

        let principals = [
            Principal::Anonymous,
            Principal::user(owner),
            Principal::user(head),
            Principal::user(collaborator),
            Principal::user(Uuid::new_v4()),
            Principal::staff(Uuid::new_v4()),
        ];

        for principal in principals {
            for project in [None, Some(&project)] {
                assert!(
                    decide(&principal, &data, project).can_read(),
                    "public dataset denied for {:?}",
                    principal
                );
            }
        }
    }

    #[test]
    fn test_viewer_cannot_write() {
        let viewer = Uuid::new_v4();
        let project = ProjectContext {
            head_researcher: Uuid::new_v4(),
            is_public: false,
            collaborators: vec![(viewer, CollaboratorRole::Viewer)],
        };
        let level = decide(
            &Principal::user(viewer),
            &dataset(Uuid::new_v4(), false),
            Some(&project),
        );
        assert!(level.can_read());
        assert!(!level.can_write());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            CollaboratorRole::Viewer,
            CollaboratorRole::Contributor,
            CollaboratorRole::Manager,
        ] {
            assert_eq!(CollaboratorRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(CollaboratorRole::parse("head"), None);
    }
}
