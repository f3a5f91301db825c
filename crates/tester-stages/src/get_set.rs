use crate::assertions::{expect_bulk_string, expect_simple_string};
use crate::words::{random_key, random_word};
use tester_core::{instrumented, StageContext, TesterError};

pub async fn get_set(ctx: StageContext) -> Result<(), TesterError> {
    let mut client = instrumented::connect_to_executable(&ctx, "").await?;
    let key = random_key();
    let value = random_word();

    let reply = client.send_and_read("SET", &[key.clone(), value.clone()]).await?;
    expect_simple_string(&reply, "OK")?;

    let reply = client.send_and_read("GET", &[key]).await?;
    expect_bulk_string(&reply, &value)?;
    ctx.logger().success(format_args!("Received {}", reply));
    Ok(())
}
