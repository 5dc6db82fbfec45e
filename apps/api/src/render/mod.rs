//! Resume → LaTeX source. Pure and total: every well-formed `Resume` renders
//! to a compilable document; escaping is the tailoring contract's job (the
//! prompt instructs the model to emit LaTeX-safe text, and the base resume is
//! authored escaped).

use crate::models::resume::{Education, Experience, Project, Resume, Skills};

const PREAMBLE: &str = r"\documentclass[letterpaper,11pt]{article}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\raggedbottom
\raggedright
\setlength{\tabcolsep}{0in}

\titleformat{\section}{\scshape\raggedright\large}{}{0em}{}[\titlerule]

\newcommand{\resumeItem}[1]{\item\small{#1}}
\newcommand{\resumeSubheading}[4]{%
  \item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \textbf{#1} & #2 \\
      \textit{\small#3} & \textit{\small #4} \\
    \end{tabular*}\vspace{-7pt}}
\newcommand{\resumeProjectHeading}[2]{%
  \item
    \begin{tabular*}{0.97\textwidth}{l@{\extracolsep{\fill}}r}
      \small#1 & #2 \\
    \end{tabular*}\vspace{-7pt}}
\newcommand{\resumeSubHeadingListStart}{\begin{itemize}[leftmargin=0.15in, label={}]}
\newcommand{\resumeSubHeadingListEnd}{\end{itemize}}
\newcommand{\resumeItemListStart}{\begin{itemize}}
\newcommand{\resumeItemListEnd}{\end{itemize}}

\begin{document}
";

const EDUCATION_TEMPLATE: &str = r"
\section{Education}
  \resumeSubHeadingListStart
    \resumeSubheading
      {{university}}{{location}}
      {{degree}}{{date}}
      \resumeItemListStart
        {bullets}
      \resumeItemListEnd
  \resumeSubHeadingListEnd
";

const EXPERIENCE_TEMPLATE: &str = r"
\resumeSubheading
  {{title}}{{date}}
  {{company}}{{location}}
  \resumeItemListStart
    {bullets}
  \resumeItemListEnd
";

const PROJECT_TEMPLATE: &str = r"
\resumeProjectHeading
  {\textbf{{title}} $|$ \emph{{skills}}}{}
  \resumeItemListStart
    {bullets}
  \resumeItemListEnd
";

const SKILLS_TEMPLATE: &str = r"
\section{Skills}
 \begin{itemize}[leftmargin=0.15in, label={}]
    \small{\item{
{sections}
    }}
 \end{itemize}
";

fn bullet_items(bullets: &[String]) -> String {
    bullets
        .iter()
        .map(|b| format!("\\resumeItem{{{b}}}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_education(education: &Education) -> String {
    EDUCATION_TEMPLATE
        .replace("{university}", &education.university)
        .replace("{location}", &education.location)
        .replace("{degree}", &education.degree)
        .replace("{date}", &education.date)
        .replace("{bullets}", &bullet_items(&education.bullets))
}

fn render_experience(experience: &Experience) -> String {
    EXPERIENCE_TEMPLATE
        .replace("{title}", &experience.title)
        .replace("{date}", &experience.date)
        .replace("{company}", &experience.company)
        .replace("{location}", &experience.location)
        .replace("{bullets}", &bullet_items(&experience.bullets))
}

fn render_project(project: &Project) -> String {
    PROJECT_TEMPLATE
        .replace("{title}", &project.title)
        .replace("{skills}", &project.skills)
        .replace("{bullets}", &bullet_items(&project.bullets))
}

fn render_skills(skills: &Skills) -> String {
    let sections = skills
        .sections
        .iter()
        .map(|(section, items)| format!("\\textbf{{{section}}}{{: {items}}}"))
        .collect::<Vec<_>>()
        .join(" \\\\\n");
    SKILLS_TEMPLATE.replace("{sections}", &sections)
}

/// Renders the full LaTeX document for a resume.
pub fn render(resume: &Resume) -> String {
    let mut doc = String::from(PREAMBLE);

    doc.push_str(&render_education(&resume.education));

    doc.push_str("\n\\section{Experience}\n  \\resumeSubHeadingListStart\n");
    for experience in &resume.experiences {
        doc.push_str(&render_experience(experience));
    }
    doc.push_str("  \\resumeSubHeadingListEnd\n");

    doc.push_str("\n\\section{Projects}\n  \\resumeSubHeadingListStart\n");
    for project in &resume.projects {
        doc.push_str(&render_project(project));
    }
    doc.push_str("  \\resumeSubHeadingListEnd\n");

    doc.push_str(&render_skills(&resume.skills));

    doc.push_str("\n\\end{document}\n");
    doc
}
