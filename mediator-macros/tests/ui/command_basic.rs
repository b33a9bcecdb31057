use mediator_abstractions::{Command, Message};
use mediator_macros::command;

#[command]
#[derive(PartialEq)]
pub struct CreateUser {
    name: String,
    age: u8,
}

fn assert_command<C: Command>(_: &C) {}

fn main() {
    let cmd = CreateUser::new("Alice".to_string(), 30);
    assert_command(&cmd);
    assert_eq!(cmd.name(), "CreateUser");
    assert_eq!(cmd.id(), cmd.metadata.id());
    assert_eq!(cmd.clone(), cmd);
    let _ = format!("{:?}", cmd);
}
