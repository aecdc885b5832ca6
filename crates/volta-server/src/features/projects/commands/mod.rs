//! Project write operations

pub mod add_collaborator;
pub mod create;
pub mod remove_collaborator;
pub mod update_collaborator;

pub use add_collaborator::{AddCollaboratorCommand, AddCollaboratorError, AddCollaboratorResponse};
pub use create::{CreateProjectCommand, CreateProjectError, CreateProjectResponse};
pub use remove_collaborator::{
    RemoveCollaboratorCommand, RemoveCollaboratorError, RemoveCollaboratorResponse,
};
pub use update_collaborator::{
    UpdateCollaboratorCommand, UpdateCollaboratorError, UpdateCollaboratorResponse,
};
