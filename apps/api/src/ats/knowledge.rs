//! Role Knowledge Base: static role definitions plus the lookup chain used to
//! resolve a free-text target role.
//!
//! Lookup is an ordered list of matcher strategies; the first strategy that
//! accepts any role wins, and within a strategy the first role in table order wins:
//! 1. exact id (spaces → underscores)
//! 2. exact name or alias
//! 3. name containment, either direction
//! 4. alias containment, either direction

use std::sync::LazyLock;

use serde::Serialize;

/// Containment strategies ignore queries shorter than this.
const MIN_SUBSTRING_QUERY_LEN: usize = 3;

/// Seniority qualifiers stripped from a query before matching.
const SENIORITY_TOKENS: &[&str] = &[
    "senior", "sr", "junior", "jr", "lead", "principal", "staff", "mid", "entry", "level",
    "associate",
];

#[derive(Debug, Serialize)]
pub struct FormattingNorms {
    pub max_pages: u8,
    pub key_sections: &'static [&'static str],
    pub style_notes: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct RoleKnowledge {
    pub id: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub industry: &'static str,
    pub required_skills: &'static [&'static str],
    pub optional_skills: &'static [&'static str],
    pub tools: &'static [&'static str],
    /// Responsibility keywords recruiters and ATS filters look for.
    pub keywords: &'static [&'static str],
    pub action_verbs: &'static [&'static str],
    pub formatting: FormattingNorms,
    pub experience_level: &'static str,
    pub tips: &'static [&'static str],
    pub common_mistakes: &'static [&'static str],
    pub metrics: &'static [&'static str],
}

pub static ROLES: &[RoleKnowledge] = &[
    RoleKnowledge {
        id: "software_engineer",
        name: "Software Engineer",
        aliases: &["Software Developer", "SWE", "Programmer", "Application Developer"],
        industry: "Technology",
        required_skills: &[
            "Python",
            "Java",
            "Data Structures",
            "Algorithms",
            "Git",
            "Testing",
            "System Design",
            "SQL",
        ],
        optional_skills: &[
            "Docker",
            "Kubernetes",
            "AWS",
            "CI/CD",
            "Microservices",
            "REST APIs",
            "Agile",
            "Linux",
            "TypeScript",
        ],
        tools: &["GitHub", "Jira", "VS Code", "Docker", "Jenkins", "Postman"],
        keywords: &[
            "scalable",
            "code review",
            "architecture",
            "performance",
            "debugging",
            "deployment",
            "production",
            "unit tests",
            "api",
            "cross-functional",
        ],
        action_verbs: &[
            "Engineered",
            "Developed",
            "Implemented",
            "Optimized",
            "Refactored",
            "Automated",
            "Shipped",
        ],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Experience", "Skills", "Projects", "Education"],
            style_notes: &["Lead with technical impact", "Group skills by category"],
        },
        experience_level: "0-3 years for junior, 3-7 for mid-level, 7+ for senior roles",
        tips: &[
            "Quantify performance wins (latency, throughput, cost)",
            "Link to a GitHub profile or portfolio",
            "Name the scale you worked at (users, requests, data volume)",
        ],
        common_mistakes: &[
            "Listing every technology ever touched",
            "Describing tasks instead of outcomes",
        ],
        metrics: &[
            "latency reduction",
            "uptime percentage",
            "deployment frequency",
            "users served",
        ],
    },
    RoleKnowledge {
        id: "frontend_developer",
        name: "Frontend Developer",
        aliases: &["Front End Developer", "React Developer", "UI Developer", "Web Developer"],
        industry: "Technology",
        required_skills: &[
            "JavaScript",
            "TypeScript",
            "React",
            "HTML",
            "CSS",
            "Responsive Design",
        ],
        optional_skills: &["Next.js", "Vue", "Redux", "Tailwind", "Accessibility", "GraphQL"],
        tools: &["Webpack", "Vite", "Figma", "Jest", "Chrome DevTools", "Storybook"],
        keywords: &[
            "user interface",
            "component",
            "performance",
            "accessibility",
            "cross-browser",
            "design system",
            "state management",
        ],
        action_verbs: &["Built", "Designed", "Implemented", "Optimized", "Launched", "Migrated"],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Experience", "Skills", "Portfolio", "Education"],
            style_notes: &["Link live projects", "Highlight UI performance numbers"],
        },
        experience_level: "Portfolio weight is high at every level",
        tips: &[
            "Include a portfolio link with live demos",
            "Mention Core Web Vitals or Lighthouse improvements",
        ],
        common_mistakes: &[
            "No links to shipped work",
            "Ignoring accessibility experience",
        ],
        metrics: &["page load time", "lighthouse score", "conversion rate", "bundle size"],
    },
    RoleKnowledge {
        id: "backend_developer",
        name: "Backend Developer",
        aliases: &["Back End Developer", "Backend Engineer", "API Developer", "Server Engineer"],
        industry: "Technology",
        required_skills: &["Node.js", "Python", "SQL", "REST APIs", "Databases", "Authentication"],
        optional_skills: &["Go", "Redis", "Kafka", "GraphQL", "Microservices", "Caching"],
        tools: &["PostgreSQL", "Docker", "AWS", "Postman", "Redis", "Kubernetes"],
        keywords: &[
            "scalable",
            "api",
            "latency",
            "throughput",
            "database",
            "reliability",
            "security",
        ],
        action_verbs: &["Architected", "Built", "Scaled", "Optimized", "Designed", "Secured"],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Experience", "Skills", "Projects", "Education"],
            style_notes: &["Describe system scale", "Call out data stores used"],
        },
        experience_level: "Mid-level roles expect production on-call experience",
        tips: &[
            "State request volumes and data sizes",
            "Describe reliability work (SLOs, incident response)",
        ],
        common_mistakes: &["No mention of scale", "Omitting database experience"],
        metrics: &["requests per second", "p99 latency", "error rate", "cost savings"],
    },
    RoleKnowledge {
        id: "data_scientist",
        name: "Data Scientist",
        aliases: &["Machine Learning Engineer", "ML Engineer", "Applied Scientist"],
        industry: "Technology",
        required_skills: &[
            "Python",
            "Statistics",
            "Machine Learning",
            "SQL",
            "Data Visualization",
            "Pandas",
        ],
        optional_skills: &["Deep Learning", "TensorFlow", "PyTorch", "Spark", "NLP", "A/B Testing"],
        tools: &["Jupyter", "Scikit-learn", "Tableau", "AWS SageMaker", "Git"],
        keywords: &[
            "model",
            "prediction",
            "experiment",
            "insights",
            "hypothesis",
            "feature engineering",
            "stakeholders",
        ],
        action_verbs: &["Modeled", "Analyzed", "Predicted", "Trained", "Deployed", "Discovered"],
        formatting: FormattingNorms {
            max_pages: 2,
            key_sections: &["Experience", "Skills", "Publications", "Education"],
            style_notes: &["Tie models to business outcomes", "List publications briefly"],
        },
        experience_level: "Advanced degree common; industry impact weighs more after 3 years",
        tips: &[
            "Connect every model to a business metric",
            "Mention dataset sizes and model performance",
        ],
        common_mistakes: &["Listing algorithms without outcomes", "Jargon-heavy summaries"],
        metrics: &["model accuracy", "revenue impact", "forecast error", "dataset size"],
    },
    RoleKnowledge {
        id: "devops_engineer",
        name: "DevOps Engineer",
        aliases: &["Site Reliability Engineer", "SRE", "Platform Engineer", "Cloud Engineer"],
        industry: "Technology",
        required_skills: &["Linux", "CI/CD", "Docker", "Kubernetes", "Infrastructure as Code", "Scripting"],
        optional_skills: &["Python", "Go", "Networking", "Security", "Observability"],
        tools: &["Terraform", "Jenkins", "AWS", "Prometheus", "Grafana", "Ansible"],
        keywords: &[
            "automation",
            "reliability",
            "uptime",
            "incident",
            "monitoring",
            "infrastructure",
            "pipeline",
        ],
        action_verbs: &["Automated", "Provisioned", "Migrated", "Hardened", "Monitored", "Scaled"],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Experience", "Skills", "Certifications", "Education"],
            style_notes: &["List cloud certifications", "Quantify automation savings"],
        },
        experience_level: "Usually requires prior ops or software experience",
        tips: &[
            "Show before/after numbers for pipelines and uptime",
            "List cloud certifications near the top",
        ],
        common_mistakes: &["Tool lists without outcomes", "No incident or on-call stories"],
        metrics: &["uptime percentage", "deployment time", "mean time to recovery", "infrastructure cost"],
    },
    RoleKnowledge {
        id: "product_manager",
        name: "Product Manager",
        aliases: &["Product Owner", "Technical Product Manager", "PM"],
        industry: "Technology",
        required_skills: &[
            "Product Strategy",
            "Roadmapping",
            "User Research",
            "Stakeholder Management",
            "Prioritization",
            "Data Analysis",
        ],
        optional_skills: &["SQL", "Agile", "A/B Testing", "Go-to-Market", "UX Design"],
        tools: &["Jira", "Confluence", "Amplitude", "Figma", "Productboard"],
        keywords: &[
            "roadmap",
            "launch",
            "customer",
            "metrics",
            "cross-functional",
            "vision",
            "requirements",
        ],
        action_verbs: &["Launched", "Led", "Defined", "Prioritized", "Drove", "Grew"],
        formatting: FormattingNorms {
            max_pages: 2,
            key_sections: &["Experience", "Skills", "Education"],
            style_notes: &["Lead bullets with outcomes", "Name the team size you led"],
        },
        experience_level: "Often 3+ years in product, engineering, or consulting",
        tips: &[
            "Show outcomes, not feature lists",
            "Mention the size of the cross-functional team",
        ],
        common_mistakes: &["Claiming sole credit for team launches", "No adoption or revenue numbers"],
        metrics: &["user adoption", "revenue growth", "retention rate", "NPS"],
    },
    RoleKnowledge {
        id: "data_analyst",
        name: "Data Analyst",
        aliases: &["Business Analyst", "BI Analyst", "Analytics Specialist"],
        industry: "Business",
        required_skills: &["SQL", "Excel", "Data Visualization", "Statistics", "Reporting"],
        optional_skills: &["Python", "R", "Dashboards", "ETL", "Forecasting"],
        tools: &["Tableau", "Power BI", "Excel", "Looker", "Google Analytics"],
        keywords: &["insights", "dashboard", "trends", "kpi", "reporting", "analysis", "stakeholders"],
        action_verbs: &["Analyzed", "Visualized", "Reported", "Identified", "Forecasted", "Streamlined"],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Experience", "Skills", "Education"],
            style_notes: &["Name the decisions your analysis drove"],
        },
        experience_level: "Entry roles value internships and capstone projects",
        tips: &[
            "Describe the decision each analysis informed",
            "List the BI tools you built dashboards in",
        ],
        common_mistakes: &["Describing tools instead of findings"],
        metrics: &["time saved", "cost reduction", "report adoption", "forecast accuracy"],
    },
    RoleKnowledge {
        id: "ux_designer",
        name: "UX Designer",
        aliases: &["Product Designer", "UI/UX Designer", "Interaction Designer", "User Experience Designer"],
        industry: "Design",
        required_skills: &["User Research", "Wireframing", "Prototyping", "Usability Testing", "Interaction Design"],
        optional_skills: &["Visual Design", "Design Systems", "HTML", "CSS", "Accessibility"],
        tools: &["Figma", "Sketch", "Adobe XD", "Miro", "InVision"],
        keywords: &["user-centered", "persona", "journey", "usability", "iteration", "research", "design system"],
        action_verbs: &["Designed", "Prototyped", "Researched", "Tested", "Redesigned", "Simplified"],
        formatting: FormattingNorms {
            max_pages: 1,
            key_sections: &["Portfolio", "Experience", "Skills", "Education"],
            style_notes: &["Portfolio link in the header", "Keep layout clean and scannable"],
        },
        experience_level: "Portfolio quality outweighs years of experience",
        tips: &[
            "Link case studies that show process, not just final screens",
            "Quantify usability improvements",
        ],
        common_mistakes: &["Over-designed resume layouts that break ATS parsing"],
        metrics: &["task completion rate", "conversion rate", "support ticket reduction"],
    },
    RoleKnowledge {
        id: "marketing_manager",
        name: "Marketing Manager",
        aliases: &["Digital Marketing Manager", "Growth Marketer", "Marketing Specialist"],
        industry: "Marketing",
        required_skills: &["Digital Marketing", "Content Strategy", "SEO", "Campaign Management", "Analytics"],
        optional_skills: &["Email Marketing", "Social Media", "Paid Advertising", "Copywriting", "Branding"],
        tools: &["Google Analytics", "HubSpot", "Google Ads", "Mailchimp", "Salesforce"],
        keywords: &["campaign", "brand", "engagement", "conversion", "roi", "audience", "growth"],
        action_verbs: &["Launched", "Grew", "Increased", "Managed", "Executed", "Generated"],
        formatting: FormattingNorms {
            max_pages: 2,
            key_sections: &["Experience", "Skills", "Education"],
            style_notes: &["Put budget and ROI numbers up front"],
        },
        experience_level: "Managers typically bring 4+ years of campaign ownership",
        tips: &[
            "State budgets managed and returns achieved",
            "Name channels you owned end to end",
        ],
        common_mistakes: &["Vanity metrics without conversion data"],
        metrics: &["ROI", "conversion rate", "lead volume", "customer acquisition cost"],
    },
];

static KNOWLEDGE_BASE: LazyLock<RoleKnowledgeBase> = LazyLock::new(RoleKnowledgeBase::builtin);

/// Resolves a search term against the built-in roles.
pub fn find_role(search_term: &str) -> Option<&'static RoleKnowledge> {
    KNOWLEDGE_BASE.find_role(search_term)
}

pub fn knowledge_base() -> &'static RoleKnowledgeBase {
    &KNOWLEDGE_BASE
}

// ────────────────────────────────────────────────────────────────────────────
// Matcher strategies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactId,
    ExactName,
    NameContains,
    AliasContains,
}

/// A normalized search term.
#[derive(Debug, Clone)]
pub struct RoleQuery {
    term: String,
}

impl RoleQuery {
    pub fn new(raw: &str) -> Self {
        let normalized = raw
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let stripped = normalized
            .split(' ')
            .filter(|token| !SENIORITY_TOKENS.contains(&token.trim_end_matches('.')))
            .collect::<Vec<_>>()
            .join(" ");

        let term = if stripped.is_empty() {
            normalized
        } else {
            stripped
        };
        Self { term }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

pub trait RoleMatcher: Send + Sync {
    fn strategy(&self) -> MatchStrategy;
    fn matches(&self, query: &RoleQuery, role: &RoleKnowledge) -> bool;
}

fn contains_either_way(candidate: &str, term: &str) -> bool {
    let candidate = candidate.to_lowercase();
    candidate.contains(term) || term.contains(candidate.as_str())
}

struct ExactIdMatcher;

impl RoleMatcher for ExactIdMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::ExactId
    }

    fn matches(&self, query: &RoleQuery, role: &RoleKnowledge) -> bool {
        query.term().replace(' ', "_") == role.id
    }
}

struct ExactNameMatcher;

impl RoleMatcher for ExactNameMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::ExactName
    }

    fn matches(&self, query: &RoleQuery, role: &RoleKnowledge) -> bool {
        std::iter::once(role.name)
            .chain(role.aliases.iter().copied())
            .any(|candidate| candidate.to_lowercase() == query.term())
    }
}

struct NameContainsMatcher;

impl RoleMatcher for NameContainsMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::NameContains
    }

    fn matches(&self, query: &RoleQuery, role: &RoleKnowledge) -> bool {
        query.term().len() >= MIN_SUBSTRING_QUERY_LEN && contains_either_way(role.name, query.term())
    }
}

struct AliasContainsMatcher;

impl RoleMatcher for AliasContainsMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::AliasContains
    }

    fn matches(&self, query: &RoleQuery, role: &RoleKnowledge) -> bool {
        query.term().len() >= MIN_SUBSTRING_QUERY_LEN
            && role
                .aliases
                .iter()
                .any(|alias| contains_either_way(alias, query.term()))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoleMatch {
    pub role: &'static RoleKnowledge,
    pub strategy: MatchStrategy,
}

pub struct RoleKnowledgeBase {
    roles: &'static [RoleKnowledge],
    matchers: Vec<Box<dyn RoleMatcher>>,
}

impl RoleKnowledgeBase {
    pub fn builtin() -> Self {
        Self::with_roles(ROLES)
    }

    pub fn with_roles(roles: &'static [RoleKnowledge]) -> Self {
        Self {
            roles,
            matchers: vec![
                Box::new(ExactIdMatcher),
                Box::new(ExactNameMatcher),
                Box::new(NameContainsMatcher),
                Box::new(AliasContainsMatcher),
            ],
        }
    }

    pub fn find_role(&self, search_term: &str) -> Option<&'static RoleKnowledge> {
        self.find_role_with_strategy(search_term).map(|m| m.role)
    }

    /// Runs the matcher chain; reports which strategy resolved the term.
    pub fn find_role_with_strategy(&self, search_term: &str) -> Option<RoleMatch> {
        let query = RoleQuery::new(search_term);
        if query.is_empty() {
            return None;
        }
        self.matchers.iter().find_map(|matcher| {
            self.roles
                .iter()
                .find(|role| matcher.matches(&query, role))
                .map(|role| RoleMatch {
                    role,
                    strategy: matcher.strategy(),
                })
        })
    }

    /// Every role accepted by any strategy, in table order.
    pub fn search_roles(&self, query: &str) -> Vec<&'static RoleKnowledge> {
        let query = RoleQuery::new(query);
        if query.is_empty() {
            return Vec::new();
        }
        self.roles
            .iter()
            .filter(|role| self.matchers.iter().any(|m| m.matches(&query, role)))
            .collect()
    }

    pub fn list_roles(&self) -> &'static [RoleKnowledge] {
        self.roles
    }

    pub fn roles_in_industry(&self, industry: &str) -> Vec<&'static RoleKnowledge> {
        self.roles
            .iter()
            .filter(|role| role.industry.eq_ignore_ascii_case(industry.trim()))
            .collect()
    }
}
