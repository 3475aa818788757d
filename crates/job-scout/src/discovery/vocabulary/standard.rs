//! Built-in job-domain vocabulary used when no vocabulary file is configured.
//!
//! "cms" is registered as a broad category of "wordpress", never as a synonym:
//! a CMS mention alone should not satisfy a moderate-mode "wordpress" search.

pub(super) const TERMS: &[(&str, &[&str], &[&str])] = &[
    (
        "wordpress",
        &["wp", "woocommerce", "elementor", "gutenberg"],
        &["cms", "php", "website", "web design"],
    ),
    (
        "developer",
        &["dev", "engineer", "programmer", "coder", "software engineer"],
        &["freelancer", "contractor", "technical"],
    ),
    (
        "engineer",
        &["developer", "programmer", "dev"],
        &["technical"],
    ),
    (
        "frontend",
        &["front-end", "front end", "ui developer"],
        &["react", "vue", "angular", "javascript", "css"],
    ),
    (
        "backend",
        &["back-end", "back end", "server-side"],
        &["api", "database", "microservices"],
    ),
    (
        "fullstack",
        &["full-stack", "full stack"],
        &["frontend", "backend", "web developer"],
    ),
    (
        "javascript",
        &["ecmascript", "typescript", "node.js"],
        &["react", "vue", "frontend"],
    ),
    (
        "react",
        &["reactjs", "react.js", "next.js"],
        &["frontend", "javascript"],
    ),
    (
        "python",
        &["django", "flask", "fastapi"],
        &["data", "scripting", "backend"],
    ),
    (
        "rust",
        &["rustlang", "tokio"],
        &["systems", "backend", "webassembly"],
    ),
    ("php", &["laravel", "symfony"], &["backend", "wordpress"]),
    (
        "designer",
        &["ui/ux", "ux designer", "ui designer", "product designer"],
        &["figma", "creative", "graphic"],
    ),
    (
        "shopify",
        &["shopify plus", "liquid"],
        &["ecommerce", "e-commerce", "cms"],
    ),
    (
        "marketing",
        &["seo", "growth", "content marketing"],
        &["social media", "copywriting"],
    ),
    (
        "writer",
        &["copywriter", "content writer", "editor"],
        &["content", "blog"],
    ),
    (
        "devops",
        &["sre", "site reliability", "platform engineer"],
        &["kubernetes", "docker", "aws", "infrastructure"],
    ),
    (
        "mobile",
        &["ios", "android", "react native", "flutter"],
        &["app"],
    ),
];

pub(super) const LOCATIONS: &[(&str, &[&str])] = &[
    (
        "new york",
        &["nyc", "new york city", "manhattan", "brooklyn"],
    ),
    (
        "san francisco",
        &["bay area", "san fran", "silicon valley"],
    ),
    ("los angeles", &["socal", "santa monica"]),
    (
        "united states",
        &["usa", "u.s.", "us-based", "united states of america"],
    ),
    (
        "united kingdom",
        &["england", "scotland", "wales", "britain"],
    ),
    ("germany", &["deutschland", "berlin", "munich", "hamburg"]),
    ("canada", &["toronto", "vancouver", "montreal"]),
];

pub(super) const REMOTE_TERMS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "anywhere",
    "distributed team",
    "fully distributed",
    "telecommute",
    "location independent",
    "home-based",
    "home based",
];
