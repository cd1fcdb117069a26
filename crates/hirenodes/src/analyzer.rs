use crate::resume::{ContactInfo, ResumeAnalysis, ResumeAnalyzer};
use async_trait::async_trait;
use hirecore::NodeError;
use regex::{Regex, RegexBuilder};

const SKILLS: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "Rust", "Go", "C++", "C#", "Ruby", "PHP",
    "Swift", "Kotlin", "React", "Angular", "Vue", "Node.js", "Django", "Flask", "Spring",
    "SQL", "PostgreSQL", "MySQL", "MongoDB", "Redis", "GraphQL", "AWS", "Azure", "GCP",
    "Docker", "Kubernetes", "Terraform", "Linux", "Git", "Machine Learning", "TensorFlow",
    "PyTorch",
];

/// Skills that are also ordinary English words; matched case-sensitively.
const CASE_SENSITIVE_SKILLS: &[&str] = &["Go", "Swift", "Rust", "Spring"];

const EDUCATION: &[(&str, &str)] = &[
    ("PhD", r"ph\.?\s?d|doctorate"),
    ("Master", r"master'?s?|m\.?\s?sc|mba"),
    ("Bachelor", r"bachelor'?s?|b\.?\s?sc|b\.?\s?a\.?\b|b\.?\s?eng"),
    ("Associate", r"associate'?s? degree"),
    ("Diploma", r"diploma"),
];

/// Minimal keyword-driven analyzer
///
/// Scores against the skills named in the job requirements when there are
/// any, otherwise on breadth of skills, experience and education.
pub struct KeywordResumeAnalyzer {
    skills: Vec<(&'static str, Regex)>,
    education: Vec<(&'static str, Regex)>,
    years: Regex,
    email: Regex,
    phone: Regex,
}

impl KeywordResumeAnalyzer {
    pub fn new() -> Self {
        let skills = SKILLS
            .iter()
            .map(|skill| {
                let pattern = format!(r"(?:^|[^\w+#.]){}(?:$|[^\w+#])", regex::escape(skill));
                let case_insensitive = !CASE_SENSITIVE_SKILLS.contains(skill);
                let re = RegexBuilder::new(&pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .expect("escaped skill pattern");
                (*skill, re)
            })
            .collect();

        let education = EDUCATION
            .iter()
            .map(|(name, pattern)| {
                let re = RegexBuilder::new(&format!(r"\b(?:{})", pattern))
                    .case_insensitive(true)
                    .build()
                    .expect("static education pattern");
                (*name, re)
            })
            .collect();

        Self {
            skills,
            education,
            years: Regex::new(r"(?i)(\d{1,2})\+?\s*(?:years?|yrs?)").expect("static pattern"),
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("static pattern"),
            phone: Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("static pattern"),
        }
    }

    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        self.skills
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn experience_years(&self, text: &str) -> Option<u32> {
        self.years
            .captures_iter(text)
            .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
            .max()
    }

    fn education(&self, text: &str) -> Vec<String> {
        self.education
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn score(
        &self,
        skills: &[String],
        years: Option<u32>,
        education: &[String],
        job_requirements: Option<&str>,
    ) -> u8 {
        let required = job_requirements
            .map(|req| self.extract_skills(req))
            .unwrap_or_default();

        if !required.is_empty() {
            let found = required.iter().filter(|r| skills.contains(r)).count();
            return ((found * 100) / required.len()) as u8;
        }

        let points = skills.len() as u32 * 10
            + years.unwrap_or(0).min(10) * 5
            + if education.is_empty() { 0 } else { 10 };
        points.min(100) as u8
    }
}

impl Default for KeywordResumeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResumeAnalyzer for KeywordResumeAnalyzer {
    async fn analyze(
        &self,
        resume: &str,
        job_requirements: Option<&str>,
    ) -> Result<ResumeAnalysis, NodeError> {
        let skills = self.extract_skills(resume);
        let experience_years = self.experience_years(resume);
        let education = self.education(resume);
        let match_score = self.score(&skills, experience_years, &education, job_requirements);

        let contact = ContactInfo {
            email: self.email.find(resume).map(|m| m.as_str().to_string()),
            phone: self.phone.find(resume).map(|m| m.as_str().trim().to_string()),
        };

        let summary = match (experience_years, skills.is_empty()) {
            (Some(years), false) => format!(
                "Candidate with {} years of experience in {}",
                years,
                skills.join(", ")
            ),
            (None, false) => format!("Candidate skilled in {}", skills.join(", ")),
            (Some(years), true) => format!("Candidate with {} years of experience", years),
            (None, true) => "No recognizable skills or experience found".to_string(),
        };

        Ok(ResumeAnalysis {
            skills,
            experience_years,
            education,
            contact,
            match_score,
            summary,
        })
    }
}
