pub fn render_submission_notification(
    form_title: &str,
    submitter_name: &str,
    submission_count: i64,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>New response on "{form_title}"</h2>
    <p><strong>Answered by:</strong> {submitter_name}</p>
    <p><strong>Total responses:</strong> {submission_count}</p>
    <p style="color: #666; font-size: 14px;">You can review the answers from your Formerr dashboard.</p>
</body>
</html>"#
    )
}

pub fn render_form_invitation(
    form_title: &str,
    form_url: &str,
    sender_name: &str,
    custom_message: Option<&str>,
) -> String {
    let message_block = custom_message
        .map(|m| format!(r#"<p style="background: #f8f9fa; padding: 15px; border-left: 4px solid #0070f3;"><em>{m}</em></p>"#))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>You've been invited to fill in a form</h2>
    <p><strong>{sender_name}</strong> invited you to answer: <strong>{form_title}</strong></p>
    {message_block}
    <p><a href="{form_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Open the form</a></p>
    <p style="color: #666; font-size: 14px;">Or copy this link into your browser:<br><code>{form_url}</code></p>
</body>
</html>"#
    )
}
