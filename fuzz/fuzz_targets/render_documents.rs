#![no_main]

use flowrole::{AccountContext, AgentPolicyBuilder, FlowRoleBuilder, TerraformJson};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let mut parts = s.splitn(4, '\n');
    let account = parts.next().unwrap_or_default();
    let region = parts.next().unwrap_or_default();
    let prefix = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();
    let context = AccountContext::new(account, region);

    let mut tf = TerraformJson::new();
    let _ = AgentPolicyBuilder::new(rest, rest, prefix, context.clone()).provision(&mut tf);
    let _ = FlowRoleBuilder::new(rest, context, prefix, prefix).build(&mut tf);

    let json = tf.to_json_pretty().expect("rendered documents always serialize");
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
});
