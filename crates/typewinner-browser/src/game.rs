//! Game-page contract: URLs, selectors and the in-page race probe.

/// Landing page of the typing-race game.
pub const GAME_URL: &str = "https://play.typeracer.com/";

/// Responses whose URL starts with this prefix carry a challenge image.
pub const CHALLENGE_URL_PREFIX: &str = "https://play.typeracer.com/challenge?id=";

/// The race's text input element.
pub const RACE_INPUT_SELECTOR: &str = ".txtInput";

/// Submit button inside the challenge dialog.
pub const CHALLENGE_SUBMIT_SELECTOR: &str = ".dialogContent button";

/// Class of the traffic-light indicator element.
pub const TRAFFIC_LIGHT_CLASS: &str = "trafficLight";

/// Background-position token that marks the "race started" light state.
pub const RACE_STARTED_OFFSET: &str = "-495px";

/// Panel holding the race passage text.
pub const PASSAGE_SELECTOR: &str = "table.inputPanel div";

/// CDP binding the probe calls to report the passage to the host.
pub const RACE_BINDING: &str = "typewinnerRaceStarted";

/// Extra launch flags; together with dropping the automation switch they
/// keep the session banner-free and stop crash-restore bubbles.
pub const LAUNCH_ARGS: &[&str] = &[
    "--disable-infobars",
    "--disable-session-crashed-bubble",
    "--hide-crash-restore-bubble",
    "--disable-session-restore",
];

pub fn is_challenge_response(url: &str) -> bool {
    url.starts_with(CHALLENGE_URL_PREFIX)
}

/// Mutation-observer probe evaluated in the page context. Installs once
/// per document, fires the race binding at most once per navigation.
pub(crate) fn race_probe_js() -> String {
    format!(
        r#"(() => {{
  if (window.__typewinnerProbe) return;
  window.__typewinnerProbe = true;
  let reported = false;
  const observer = new MutationObserver((mutations) => {{
    if (reported) return;
    for (const mutation of mutations) {{
      const el = mutation.target;
      if (el.classList && el.classList.contains('{class_name}') &&
          el.style && el.style.background.includes('{offset}')) {{
        const panel = document.querySelector('{panel}');
        if (panel && panel.textContent) {{
          reported = true;
          window.{binding}(panel.textContent);
        }}
        return;
      }}
    }}
  }});
  observer.observe(document.body, {{ attributes: true, subtree: true }});
}})()"#,
        class_name = TRAFFIC_LIGHT_CLASS,
        offset = RACE_STARTED_OFFSET,
        panel = PASSAGE_SELECTOR,
        binding = RACE_BINDING,
    )
}
