use crate::assertions::expect_bulk_string;
use crate::words::random_word;
use tester_core::{instrumented, StageContext, TesterError};

pub async fn echo(ctx: StageContext) -> Result<(), TesterError> {
    let mut client = instrumented::connect_to_executable(&ctx, "").await?;
    let word = random_word();

    let reply = client.send_and_read("ECHO", &[word.clone()]).await?;
    expect_bulk_string(&reply, &word)?;
    ctx.logger().success(format_args!("Received {}", reply));
    Ok(())
}
