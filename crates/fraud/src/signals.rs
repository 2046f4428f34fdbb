//! Individual bot heuristics and their weights.
//!
//! Each check reads one slice of a [`ReportedEnvironment`]. Missing data
//! never fires a check, with one exception: an empty referrer is itself the
//! direct-traffic signal.

use url::Url;

use crate::probe::ReportedEnvironment;

/// One weighted heuristic over the reported environment.
#[derive(Clone, Copy)]
pub struct SignalCheck {
    pub name: &'static str,
    pub weight: u32,
    pub detect: fn(&ReportedEnvironment) -> bool,
}

/// Name and weight of the interaction check, which runs last and is the
/// only one that waits.
pub const NO_INTERACTION: &str = "No human interaction";
pub const NO_INTERACTION_WEIGHT: u32 = 25;

/// Synchronous checks in evaluation order. The order is visible in
/// `FraudRiskResult::factors`.
pub const ENVIRONMENT_CHECKS: [SignalCheck; 10] = [
    SignalCheck {
        name: "WebDriver automation markers",
        weight: 40,
        detect: has_automation_markers,
    },
    SignalCheck {
        name: "Automation framework globals",
        weight: 30,
        detect: has_framework_globals,
    },
    SignalCheck {
        name: "Bot user agent",
        weight: 35,
        detect: has_bot_user_agent,
    },
    SignalCheck {
        name: "Headless browser",
        weight: 30,
        detect: is_headless,
    },
    SignalCheck {
        name: "Suspicious screen resolution",
        weight: 15,
        detect: has_suspicious_screen,
    },
    SignalCheck {
        name: "Generic timezone",
        weight: 10,
        detect: has_generic_timezone,
    },
    SignalCheck {
        name: "Direct traffic without tracking",
        weight: 5,
        detect: is_untracked_direct_traffic,
    },
    SignalCheck {
        name: "Cookies disabled",
        weight: 10,
        detect: cookies_disabled,
    },
    SignalCheck {
        name: "Platform mismatch",
        weight: 20,
        detect: has_platform_mismatch,
    },
    SignalCheck {
        name: "Missing browser capabilities",
        weight: 15,
        detect: missing_capabilities,
    },
];

const AUTOMATION_MARKERS: &[&str] = &[
    "__webdriver_evaluate",
    "__selenium_evaluate",
    "__webdriver_script_function",
    "__webdriver_script_func",
    "__webdriver_script_fn",
    "__fxdriver_evaluate",
    "__driver_unwrapped",
    "__webdriver_unwrapped",
    "__driver_evaluate",
    "__selenium_unwrapped",
    "__fxdriver_unwrapped",
    "__lastWatirAlert",
    "__lastWatirConfirm",
    "__lastWatirPrompt",
    "_Selenium_IDE_Recorder",
    "_selenium",
    "calledSelenium",
    "$cdc_asdjflasutopfhvcZLmcfl_",
    "$chrome_asyncScriptInfo",
    "__$webdriverAsyncExecutor",
];

const FRAMEWORK_GLOBALS: &[&str] = &[
    "_phantom",
    "callPhantom",
    "__nightmare",
    "domAutomation",
    "domAutomationController",
    "__playwright",
    "__pwInitScripts",
    "__puppeteer_evaluation_script__",
    "Buffer",
    "emit",
    "spawn",
];

const BOT_USER_AGENT_PATTERNS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "headless",
    "phantomjs",
    "slimerjs",
    "selenium",
    "webdriver",
    "puppeteer",
    "playwright",
    "electron",
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "go-http-client",
    "java/",
    "okhttp",
    "axios",
    "node-fetch",
    "scrapy",
];

const SOFTWARE_RENDERERS: &[&str] = &[
    "swiftshader",
    "llvmpipe",
    "softpipe",
    "mesa offscreen",
    "software rasterizer",
];

const HEADLESS_SCREENS: &[(u32, u32)] = &[(800, 600), (0, 0)];
const MIN_SCREEN_WIDTH: u32 = 320;
const MIN_SCREEN_HEIGHT: u32 = 240;

const GENERIC_TIMEZONES: &[&str] = &[
    "utc",
    "gmt",
    "uct",
    "zulu",
    "universal",
    "greenwich",
    "etc/utc",
    "etc/gmt",
    "etc/uct",
    "etc/zulu",
    "etc/universal",
    "etc/greenwich",
    "etc/gmt0",
    "etc/gmt+0",
    "etc/gmt-0",
    "gmt0",
    "gmt+0",
    "gmt-0",
];

/// Query parameters that mark a visit as coming from a tracked campaign.
pub const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "gclid",
    "fbclid",
    "ttclid",
];

fn lowercase_user_agent(env: &ReportedEnvironment) -> Option<String> {
    env.user_agent.as_ref().map(|ua| ua.to_ascii_lowercase())
}

pub fn has_automation_markers(env: &ReportedEnvironment) -> bool {
    env.webdriver == Some(true)
        || env
            .globals
            .as_ref()
            .is_some_and(|globals| globals.iter().any(|g| AUTOMATION_MARKERS.contains(&g.as_str())))
}

pub fn has_framework_globals(env: &ReportedEnvironment) -> bool {
    env.globals
        .as_ref()
        .is_some_and(|globals| globals.iter().any(|g| FRAMEWORK_GLOBALS.contains(&g.as_str())))
}

pub fn has_bot_user_agent(env: &ReportedEnvironment) -> bool {
    lowercase_user_agent(env)
        .is_some_and(|ua| BOT_USER_AGENT_PATTERNS.iter().any(|p| ua.contains(p)))
}

/// Any of: no plugins, no languages, a software GPU renderer, or a Chrome
/// user agent without the Chrome runtime object.
pub fn is_headless(env: &ReportedEnvironment) -> bool {
    let no_plugins = env.plugin_count == Some(0);
    let no_languages = env.languages.as_ref().is_some_and(|l| l.is_empty());
    let software_gpu = env.gpu_renderer.as_ref().is_some_and(|r| {
        let r = r.to_ascii_lowercase();
        SOFTWARE_RENDERERS.iter().any(|s| r.contains(s))
    });
    let missing_chrome_runtime = env.chrome_runtime == Some(false)
        && lowercase_user_agent(env).is_some_and(|ua| ua.contains("chrome"));

    no_plugins || no_languages || software_gpu || missing_chrome_runtime
}

pub fn has_suspicious_screen(env: &ReportedEnvironment) -> bool {
    match (env.screen_width, env.screen_height) {
        (Some(w), Some(h)) => {
            HEADLESS_SCREENS.contains(&(w, h)) || w < MIN_SCREEN_WIDTH || h < MIN_SCREEN_HEIGHT
        }
        _ => false,
    }
}

pub fn has_generic_timezone(env: &ReportedEnvironment) -> bool {
    env.timezone.as_ref().is_some_and(|tz| {
        let tz = tz.trim().to_ascii_lowercase();
        GENERIC_TIMEZONES.contains(&tz.as_str())
    })
}

/// No referrer and no campaign-tracking parameters on the landing URL. Needs
/// both the referrer and the page URL to have been reported.
pub fn is_untracked_direct_traffic(env: &ReportedEnvironment) -> bool {
    let (Some(referrer), Some(page_url)) = (env.referrer.as_ref(), env.page_url.as_ref()) else {
        return false;
    };
    if !referrer.trim().is_empty() {
        return false;
    }
    !has_tracking_params(page_url)
}

/// Whether a URL carries any campaign-tracking query parameter. Unparseable
/// URLs carry none.
pub fn has_tracking_params(page_url: &str) -> bool {
    Url::parse(page_url)
        .map(|url| {
            url.query_pairs()
                .any(|(key, _)| TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        })
        .unwrap_or(false)
}

pub fn cookies_disabled(env: &ReportedEnvironment) -> bool {
    env.cookies_enabled == Some(false)
}

/// `navigator.platform` names an OS the user agent does not mention.
/// Unrecognised platforms never mismatch.
pub fn has_platform_mismatch(env: &ReportedEnvironment) -> bool {
    let (Some(platform), Some(ua)) = (env.platform.as_ref(), lowercase_user_agent(env)) else {
        return false;
    };
    let platform = platform.to_ascii_lowercase();

    let expected: &[&str] = if platform.starts_with("win") {
        &["windows"]
    } else if platform.starts_with("mac") {
        &["macintosh", "mac os"]
    } else if platform.contains("iphone") {
        &["iphone"]
    } else if platform.contains("ipad") {
        &["ipad", "macintosh"]
    } else if platform.contains("ipod") {
        &["ipod"]
    } else if platform.contains("android") {
        &["android"]
    } else if platform.contains("linux") {
        &["linux", "android", "cros", "x11"]
    } else {
        return false;
    };

    !expected.iter().any(|token| ua.contains(token))
}

pub fn missing_capabilities(env: &ReportedEnvironment) -> bool {
    env.capabilities.as_ref().is_some_and(|caps| {
        [
            caps.local_storage,
            caps.session_storage,
            caps.fetch,
            caps.promise,
            caps.cookies,
        ]
        .contains(&Some(false))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::BrowserCapabilities;

    const DESKTOP_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

    #[test]
    fn test_weights_sum_past_the_clamp() {
        let total: u32 = ENVIRONMENT_CHECKS.iter().map(|c| c.weight).sum::<u32>() + NO_INTERACTION_WEIGHT;
        assert_eq!(total, 235);
    }

    #[test]
    fn test_empty_environment_fires_nothing() {
        let env = ReportedEnvironment::default();
        for check in ENVIRONMENT_CHECKS {
            assert!(!(check.detect)(&env), "{} fired on empty input", check.name);
        }
    }

    #[test]
    fn test_automation_markers() {
        let env = ReportedEnvironment {
            webdriver: Some(true),
            ..Default::default()
        };
        assert!(has_automation_markers(&env));

        let env = ReportedEnvironment {
            globals: Some(vec!["$cdc_asdjflasutopfhvcZLmcfl_".into()]),
            ..Default::default()
        };
        assert!(has_automation_markers(&env));
        assert!(!has_framework_globals(&env));

        let env = ReportedEnvironment {
            globals: Some(vec!["callPhantom".into(), "dataLayer".into()]),
            ..Default::default()
        };
        assert!(has_framework_globals(&env));
    }

    #[test]
    fn test_bot_user_agents() {
        for ua in [
            "Googlebot/2.1 (+http://www.google.com/bot.html)",
            "Mozilla/5.0 (X11; Linux x86_64) HeadlessChrome/120.0.0.0",
            "python-requests/2.31.0",
            "curl/8.4.0",
        ] {
            let env = ReportedEnvironment {
                user_agent: Some(ua.into()),
                ..Default::default()
            };
            assert!(has_bot_user_agent(&env), "{ua}");
        }

        let env = ReportedEnvironment {
            user_agent: Some(DESKTOP_CHROME.into()),
            ..Default::default()
        };
        assert!(!has_bot_user_agent(&env));
    }

    #[test]
    fn test_headless_indicators() {
        let env = ReportedEnvironment {
            gpu_renderer: Some("Google SwiftShader".into()),
            ..Default::default()
        };
        assert!(is_headless(&env));

        let env = ReportedEnvironment {
            user_agent: Some(DESKTOP_CHROME.into()),
            chrome_runtime: Some(false),
            ..Default::default()
        };
        assert!(is_headless(&env));

        let env = ReportedEnvironment {
            user_agent: Some(DESKTOP_CHROME.into()),
            chrome_runtime: Some(true),
            plugin_count: Some(5),
            languages: Some(vec!["en-US".into()]),
            gpu_renderer: Some("ANGLE (NVIDIA GeForce RTX 3070)".into()),
            ..Default::default()
        };
        assert!(!is_headless(&env));
    }

    #[test]
    fn test_screen_and_timezone() {
        let screen = |w, h| ReportedEnvironment {
            screen_width: Some(w),
            screen_height: Some(h),
            ..Default::default()
        };
        assert!(has_suspicious_screen(&screen(800, 600)));
        assert!(has_suspicious_screen(&screen(200, 900)));
        assert!(!has_suspicious_screen(&screen(1920, 1080)));
        assert!(!has_suspicious_screen(&screen(390, 844)));

        let tz = |zone: &str| ReportedEnvironment {
            timezone: Some(zone.into()),
            ..Default::default()
        };
        assert!(has_generic_timezone(&tz("UTC")));
        assert!(has_generic_timezone(&tz("Etc/GMT")));
        assert!(!has_generic_timezone(&tz("Europe/London")));
    }

    #[test]
    fn test_direct_traffic() {
        let visit = |referrer: &str, url: &str| ReportedEnvironment {
            referrer: Some(referrer.into()),
            page_url: Some(url.into()),
            ..Default::default()
        };
        assert!(is_untracked_direct_traffic(&visit("", "https://shop.example.com/")));
        assert!(!is_untracked_direct_traffic(&visit(
            "",
            "https://shop.example.com/?utm_source=facebook&utm_campaign=spring"
        )));
        assert!(!is_untracked_direct_traffic(&visit("", "https://shop.example.com/?gclid=abc")));
        assert!(!is_untracked_direct_traffic(&visit(
            "https://news.example.org/",
            "https://shop.example.com/"
        )));
    }

    #[test]
    fn test_platform_mismatch() {
        let env = |platform: &str, ua: &str| ReportedEnvironment {
            platform: Some(platform.into()),
            user_agent: Some(ua.into()),
            ..Default::default()
        };
        assert!(!has_platform_mismatch(&env("Win32", DESKTOP_CHROME)));
        assert!(has_platform_mismatch(&env("Linux x86_64", DESKTOP_CHROME)));
        assert!(has_platform_mismatch(&env(
            "Win32",
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        )));
        assert!(!has_platform_mismatch(&env("PlayStation 5", DESKTOP_CHROME)));
    }

    #[test]
    fn test_missing_capabilities() {
        let env = ReportedEnvironment {
            capabilities: Some(BrowserCapabilities {
                local_storage: Some(true),
                session_storage: Some(true),
                fetch: Some(false),
                promise: Some(true),
                cookies: None,
            }),
            ..Default::default()
        };
        assert!(missing_capabilities(&env));

        let env = ReportedEnvironment {
            capabilities: Some(BrowserCapabilities::default()),
            ..Default::default()
        };
        assert!(!missing_capabilities(&env));
    }
}
