use crate::{sessions::repo::SessionRepo, teachers::repo::TeacherRepo, users::repo::UserRepo};

pub mod memory;
pub mod postgres;

/// Everything the handlers need from persistence.
pub trait Store: UserRepo + TeacherRepo + SessionRepo {}

impl<T> Store for T where T: UserRepo + TeacherRepo + SessionRepo {}
