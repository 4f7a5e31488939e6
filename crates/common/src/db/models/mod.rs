//! SeaORM entity models
//!
//! Database entities for the LexHub dictionary schema

mod example;
mod meaning;
mod note;
mod password_reset_token;
mod user;
mod word;

pub use word::{
    Entity as WordEntity,
    Model as Word,
    ActiveModel as WordActiveModel,
    Column as WordColumn,
};

pub use meaning::{
    Entity as MeaningEntity,
    Model as Meaning,
    ActiveModel as MeaningActiveModel,
    Column as MeaningColumn,
};

pub use example::{
    Entity as ExampleEntity,
    Model as Example,
    ActiveModel as ExampleActiveModel,
    Column as ExampleColumn,
};

pub use note::{
    Entity as NoteEntity,
    Model as Note,
    ActiveModel as NoteActiveModel,
    Column as NoteColumn,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Role,
};

pub use password_reset_token::{
    Entity as PasswordResetTokenEntity,
    Model as PasswordResetToken,
    ActiveModel as PasswordResetTokenActiveModel,
    Column as PasswordResetTokenColumn,
};
