use mediator_abstractions::{CommandWithResult, MessageMetadata};
use mediator_macros::command;

#[command(result = Vec<i64>)]
struct Range {
    from: i64,
    to: i64,
}

fn result_type<C: CommandWithResult<Result = Vec<i64>>>(cmd: &C) -> &C {
    cmd
}

fn main() {
    let meta = MessageMetadata::builder()
        .created_by("system".to_string())
        .build();
    let cmd = Range::new(1, 3).with_metadata(meta.clone());
    let cmd = result_type(&cmd);
    assert_eq!(cmd.metadata, meta);
    assert_eq!(cmd.from + cmd.to, 4);
}
