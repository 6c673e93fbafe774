//! HTML form rendering — a thin collaborator over the session's pre-fill
//! record. Read-only fields mirror the merge engine's protected set; the
//! engine enforces that protection server-side regardless of what this
//! page renders.

use ccew_core::Session;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>CCEW Form - Job #__SERIAL__</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
    h1 { color: #333; }
    .info { background: #f0f0f0; padding: 15px; margin: 20px 0; border-radius: 5px; }
    label { display: block; margin: 15px 0 5px; font-weight: bold; }
    input, select { width: 100%; padding: 8px; margin-bottom: 10px; }
    input[readonly] { background: #eee; }
    fieldset { margin-top: 20px; }
    button { background: #007bff; color: white; padding: 12px 30px; border: none; border-radius: 5px; cursor: pointer; font-size: 16px; }
    button:hover { background: #0056b3; }
  </style>
</head>
<body>
  <h1>Certificate of Compliance - Electrical Work</h1>
  <div class="info">
    <p><strong>Job Number:</strong> __SERIAL__</p>
    <p><strong>Customer:</strong> __CUSTOMER_COMPANY__</p>
    <p><strong>Site:</strong> __PROPERTY__</p>
    <p><strong>Installer:</strong> __INSTALLER_COMPANY__ (licence __INSTALLER_LICENCE__)</p>
  </div>

  <form id="ccewForm">
    <h2>Installation Address</h2>
    <label>Street Number:</label><input type="text" name="street_number" required>
    <label>Street Name:</label><input type="text" name="street_name" required>
    <label>Suburb:</label><input type="text" name="suburb" required>
    <label>State:</label><input type="text" name="state" value="NSW" required>
    <label>Post Code:</label><input type="text" name="post_code" required>
    <label>NMI:</label><input type="text" name="nmi" required>

    <h2>Customer</h2>
    <label>First Name:</label><input type="text" name="customer_first_name" value="__CUSTOMER_FIRST__" required>
    <label>Last Name:</label><input type="text" name="customer_last_name" value="__CUSTOMER_LAST__" required>
    <label>Street:</label><input type="text" name="customer_street" required>
    <label>Suburb:</label><input type="text" name="customer_suburb" required>
    <label>State:</label><input type="text" name="customer_state" value="NSW" required>
    <label>Post Code:</label><input type="text" name="customer_post_code" required>

    <h2>Installation</h2>
    <label>Installation Type:</label>
    <select name="installation_type" required>
      <option value="">-- Select --</option>
      <option>New installation</option>
      <option>Alteration or addition</option>
      <option>Repair</option>
    </select>

    <fieldset>
      <legend>Work Carried Out</legend>
      <label><input type="checkbox" name="work_carried_out" value="Switchboard"> Switchboard</label>
      <label><input type="checkbox" name="work_carried_out" value="Wiring"> Wiring</label>
      <label><input type="checkbox" name="work_carried_out" value="Safety switch"> Safety switch</label>
      <label><input type="checkbox" name="work_carried_out" value="Metering equipment"> Metering equipment</label>
    </fieldset>

    <fieldset>
      <legend>Special Conditions</legend>
      <label><input type="checkbox" name="special_conditions" value="Off-peak metering"> Off-peak metering</label>
      <label><input type="checkbox" name="special_conditions" value="Controlled load"> Controlled load</label>
    </fieldset>

    <h2>Test Results</h2>
    <label>Tester First Name:</label><input type="text" name="tester_first_name" value="__TESTER_FIRST__" __TESTER_NAME_RO__ required>
    <label>Tester Last Name:</label><input type="text" name="tester_last_name" value="__TESTER_LAST__" __TESTER_NAME_RO__ required>
    <label>Tester Licence Number:</label><input type="text" name="license_number" value="__TESTER_LICENCE__" __TESTER_LIC_RO__ required>
    <label>Licence Expiry Date:</label><input type="date" name="license_expiry" value="__TESTER_EXPIRY__" __TESTER_EXP_RO__ required>
    <label>Test Completion Date:</label><input type="date" name="test_date" required>

    <h2>Energy Provider</h2>
    <select name="energy_provider" required>
      <option value="">-- Select --</option>
      <option>Ausgrid</option>
      <option>Endeavour Energy</option>
      <option>Essential Energy</option>
    </select>

    <h2>Notifications</h2>
    <label>Meter Provider Email (optional):</label><input type="email" name="meter_provider_email">
    <label>Owner Email (optional):</label><input type="email" name="owner_email">

    <label><input type="checkbox" name="certification_statement" value="true">
      I certify that the electrical work described complies with the applicable standards.</label>

    <button type="submit">Submit CCEW</button>
  </form>

  <script>
    document.getElementById('ccewForm').addEventListener('submit', async (e) => {
      e.preventDefault();
      const form = e.target;
      const data = {};
      for (const el of form.elements) {
        if (!el.name) continue;
        if (el.type === 'checkbox') {
          if (el.name === 'certification_statement') {
            data[el.name] = el.checked;
          } else {
            data[el.name] = data[el.name] || [];
            if (el.checked) data[el.name].push(el.value);
          }
        } else {
          data[el.name] = el.value;
        }
      }
      const response = await fetch('/api/ccew/submit/__SESSION_ID__', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(data)
      });
      const result = await response.json();
      if (result.success) {
        window.location.href = '/success';
      } else {
        alert('Error: ' + result.error);
      }
    });
  </script>
</body>
</html>
"#;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `readonly` attribute when the pre-fill derived a value for the field —
/// matches the merge engine's locked-credential rule.
fn readonly_if(derived: &str) -> &'static str {
    if derived.trim().is_empty() {
        ""
    } else {
        "readonly"
    }
}

pub fn render_form(session: &Session) -> String {
    let prefill = &session.prefill;
    TEMPLATE
        .replace("__SESSION_ID__", &session.id.to_string())
        .replace("__SERIAL__", &escape(&prefill.certificate_serial))
        .replace("__PROPERTY__", &escape(&prefill.property_name))
        .replace("__CUSTOMER_COMPANY__", &escape(&prefill.customer_company))
        .replace("__CUSTOMER_FIRST__", &escape(&prefill.customer_first_name))
        .replace("__CUSTOMER_LAST__", &escape(&prefill.customer_last_name))
        .replace("__INSTALLER_COMPANY__", &escape(&prefill.installer_company))
        .replace("__INSTALLER_LICENCE__", &escape(&prefill.installer_licence))
        .replace("__TESTER_FIRST__", &escape(&prefill.tester_first_name))
        .replace("__TESTER_LAST__", &escape(&prefill.tester_last_name))
        .replace("__TESTER_LICENCE__", &escape(&prefill.tester_licence))
        .replace("__TESTER_EXPIRY__", &escape(&prefill.tester_licence_expiry))
        .replace(
            "__TESTER_NAME_RO__",
            readonly_if(&prefill.tester_first_name),
        )
        .replace("__TESTER_LIC_RO__", readonly_if(&prefill.tester_licence))
        .replace("__TESTER_EXP_RO__", readonly_if(&prefill.tester_licence_expiry))
}

pub const SUCCESS_PAGE: &str = "<h1>CCEW Submitted Successfully</h1>\
<p>Thank you! The certificate has been sent to the energy provider.</p>";
