//! Site source generation
//!
//! Produces the source file set for a business when the caller does not
//! supply one. The generated project is a minimal Next.js static export:
//! the profile is written as JSON and read by fixed page components.

use serde_json::json;
use siteforge_core::domain::business::BusinessProfile;
use siteforge_core::domain::site::{SourceFileSet, slugify};

/// Produces site sources for a business profile
pub trait SiteGenerator: Send + Sync {
    fn generate(&self, business: &BusinessProfile) -> SourceFileSet;
}

/// Next.js static-export scaffold
#[derive(Debug, Clone)]
pub struct StaticExportGenerator {
    next_version: String,
    react_version: String,
}

impl StaticExportGenerator {
    pub fn new() -> Self {
        Self {
            next_version: "14.2.5".to_string(),
            react_version: "18.3.1".to_string(),
        }
    }

    fn package_json(&self, business: &BusinessProfile) -> String {
        let manifest = json!({
            "name": slugify(&business.name),
            "version": "0.1.0",
            "private": true,
            "scripts": {
                "build": "next build"
            },
            "dependencies": {
                "next": self.next_version,
                "react": self.react_version,
                "react-dom": self.react_version
            }
        });

        format!("{:#}\n", manifest)
    }
}

impl Default for StaticExportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

const NEXT_CONFIG: &str = "/** @type {import('next').NextConfig} */
module.exports = {
  output: 'export',
  images: { unoptimized: true },
};
";

const LAYOUT: &str = "import './globals.css';
import site from './site-data.json';

export const metadata = {
  title: site.name,
  description: site.tagline || site.description || '',
};

export default function RootLayout({ children }) {
  return (
    <html lang=\"en\">
      <body>{children}</body>
    </html>
  );
}
";

const PAGE: &str = "import site from './site-data.json';

export default function Home() {
  const contact = [site.address, site.phone, site.email].filter(Boolean);

  return (
    <main>
      <header>
        <h1>{site.name}</h1>
        {site.tagline && <p className=\"tagline\">{site.tagline}</p>}
      </header>
      {site.description && <section><p>{site.description}</p></section>}
      {site.services.length > 0 && (
        <section>
          <h2>Services</h2>
          <ul>
            {site.services.map((service) => (
              <li key={service}>{service}</li>
            ))}
          </ul>
        </section>
      )}
      {contact.length > 0 && (
        <footer>
          {contact.map((line) => (
            <p key={line}>{line}</p>
          ))}
        </footer>
      )}
    </main>
  );
}
";

const GLOBALS_CSS: &str = "body {
  margin: 0;
  font-family: system-ui, sans-serif;
  color: #1f2933;
}

main {
  max-width: 48rem;
  margin: 0 auto;
  padding: 2rem 1rem;
}

.tagline {
  color: #52606d;
}
";

impl SiteGenerator for StaticExportGenerator {
    fn generate(&self, business: &BusinessProfile) -> SourceFileSet {
        let site_data = json!({
            "name": business.name,
            "tagline": business.tagline,
            "description": business.description,
            "address": business.address,
            "phone": business.phone,
            "email": business.email,
            "website": business.website,
            "services": business.services,
        });

        let mut files = SourceFileSet::new();
        files.insert("package.json".to_string(), self.package_json(business));
        files.insert("next.config.js".to_string(), NEXT_CONFIG.to_string());
        files.insert("app/layout.js".to_string(), LAYOUT.to_string());
        files.insert("app/page.js".to_string(), PAGE.to_string());
        files.insert("app/globals.css".to_string(), GLOBALS_CSS.to_string());
        files.insert("app/site-data.json".to_string(), format!("{:#}\n", site_data));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Joe's \"Best\" Pizza".to_string(),
            tagline: Some("Slices since 1987".to_string()),
            services: vec!["Dine-in".to_string(), "Delivery".to_string()],
            ..BusinessProfile::default()
        }
    }

    #[test]
    fn test_generates_static_export_project() {
        let files = StaticExportGenerator::new().generate(&profile());

        let paths: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "app/globals.css",
                "app/layout.js",
                "app/page.js",
                "app/site-data.json",
                "next.config.js",
                "package.json"
            ]
        );
        assert!(files["next.config.js"].contains("output: 'export'"));
    }

    #[test]
    fn test_package_json_uses_slug() {
        let files = StaticExportGenerator::new().generate(&profile());
        let manifest: serde_json::Value = serde_json::from_str(&files["package.json"]).unwrap();

        assert_eq!(manifest["name"], "joe-s-best-pizza");
        assert_eq!(manifest["scripts"]["build"], "next build");
    }

    #[test]
    fn test_site_data_round_trips_profile() {
        let files = StaticExportGenerator::new().generate(&profile());
        let data: serde_json::Value = serde_json::from_str(&files["app/site-data.json"]).unwrap();

        assert_eq!(data["name"], "Joe's \"Best\" Pizza");
        assert_eq!(data["tagline"], "Slices since 1987");
        assert_eq!(data["description"], serde_json::Value::Null);
        assert_eq!(data["services"][1], "Delivery");
    }
}
