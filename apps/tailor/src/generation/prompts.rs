// Prompt constants for resume generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Task framing placed at the top of every instruction.
pub const TASK_FRAMING: &str = "\
Generate a highly optimized, ATS-friendly resume in LaTeX following the exact template provided. \
Extract ALL relevant details from the given resume and align them with the job description so that the \
most relevant skills, projects, and experiences are highlighted. Prioritize high-impact keywords from the \
job description.

Include ALL relevant experience, education, projects, and certifications from the original resume that \
match the job requirements. Keep bullet points concise and action-oriented, quantify accomplishments where \
the source supports it, and never invent facts that are not in the resume or the additional details.";

/// Instructions placed after the template.
pub const FILL_CHECKLIST: &str = "\
Fill in every section of the template with optimized content from the original resume. Make sure to:
1. Match the exact LaTeX structure shown above, including the preamble and custom commands
2. Extract and optimize the content from the original resume and the additional details
3. Mirror keywords and phrases from the job description where the resume supports them
4. Highlight skills and experiences that align with the job requirements
5. Focus on achievements and metrics relevant to the position
6. Use strong action verbs
7. Keep every section of the template; use \\resumeSubheading{Organization}{Location}{Title}{Dates} for \
experience and education, \\resumeProjectHeading{Summary}{Dates} for projects, and \\resumeItem{...} for bullets
8. Escape LaTeX special characters (%, &, $, #, _) in the content";

/// The fixed target-markup template. Placeholders `{full_name}`, `{email}`,
/// `{linkedin}` and `{github}` are seeded from the source resume.
pub const RESUME_TEMPLATE: &str = r#"%-------------------------
% Resume in LaTeX
% Author : Jake Gutierrez
% Based off of: https://github.com/sb2nov/resume
% License : MIT
%------------------------

\documentclass[letterpaper,11pt]{article}

\usepackage{latexsym}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage{marvosym}
\usepackage[usenames,dvipsnames]{color}
\usepackage{verbatim}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\usepackage{fancyhdr}
\usepackage[english]{babel}
\usepackage{tabularx}
\input{glyphtounicode}

\pagestyle{fancy}
\fancyhf{}
\fancyfoot{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}

\addtolength{\oddsidemargin}{-0.5in}
\addtolength{\evensidemargin}{-0.5in}
\addtolength{\textwidth}{1in}
\addtolength{\topmargin}{-.5in}
\addtolength{\textheight}{1.0in}

\urlstyle{same}

\raggedbottom
\raggedright
\setlength{\tabcolsep}{0in}

\titleformat{\section}{
  \vspace{-4pt}\scshape\raggedright\large
}{}{0em}{}[\color{black}\titlerule \vspace{-5pt}]

\pdfgentounicode=1

\newcommand{\resumeItem}[1]{
  \item\small{
    {#1 \vspace{-2pt}}
  }
}

\newcommand{\resumeSubheading}[4]{
  \vspace{-2pt}\item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \textbf{#1} & #2 \\
      \textit{\small#3} & \textit{\small #4} \\
    \end{tabular*}\vspace{-7pt}
}

\newcommand{\resumeProjectHeading}[2]{
    \item
    \begin{tabular*}{0.97\textwidth}{l@{\extracolsep{\fill}}r}
      \small#1 & #2 \\
    \end{tabular*}\vspace{-7pt}
}

\renewcommand\labelitemii{$\vcenter{\hbox{\tiny$\bullet$}}$}

\newcommand{\resumeSubHeadingListStart}{\begin{itemize}[leftmargin=0.15in, label={}]}
\newcommand{\resumeSubHeadingListEnd}{\end{itemize}}
\newcommand{\resumeItemListStart}{\begin{itemize}}
\newcommand{\resumeItemListEnd}{\end{itemize}\vspace{-5pt}}

%-------------------------------------------
%%%%%%  RESUME STARTS HERE  %%%%%%%%%%%%%%%%%%%%%%%%%%%%

\begin{document}

\begin{center}
    \textbf{\Huge \scshape {full_name}} \\ \vspace{1pt}
    \small \href{mailto:{email}}{\underline{{email}}} $|$
    \href{https://{linkedin}}{\underline{{linkedin}}} $|$
    \href{https://{github}}{\underline{{github}}}
\end{center}

\section{Summary}
A tailored summary that highlights the qualifications most relevant to the target position.

\section{Technical Skills}
 \begin{itemize}[leftmargin=0.15in, label={}]
    \small{\item{
     \textbf{Languages}{: LIST OF LANGUAGES} \\
     \textbf{Frameworks}{: LIST OF FRAMEWORKS} \\
     \textbf{Developer Tools}{: LIST OF TOOLS} \\
     \textbf{Libraries}{: LIST OF LIBRARIES}
    }}
 \end{itemize}

\section{Experience}
  \resumeSubHeadingListStart
    \resumeSubheading
      {COMPANY NAME}{LOCATION}
      {JOB TITLE}{DATES}
      \resumeItemListStart
        \resumeItem{BULLET POINT ABOUT ACHIEVEMENT}
        \resumeItem{BULLET POINT ABOUT ACHIEVEMENT}
      \resumeItemListEnd
  \resumeSubHeadingListEnd

\section{Projects}
    \resumeSubHeadingListStart
      \resumeProjectHeading
          {\textbf{PROJECT NAME} $|$ \emph{TECHNOLOGIES USED}}{DATES}
          \resumeItemListStart
            \resumeItem{BULLET POINT ABOUT PROJECT}
            \resumeItem{BULLET POINT ABOUT PROJECT}
          \resumeItemListEnd
    \resumeSubHeadingListEnd

\section{Education}
  \resumeSubHeadingListStart
    \resumeSubheading
      {UNIVERSITY NAME}{LOCATION}
      {DEGREE}{DATES}
  \resumeSubHeadingListEnd

\end{document}
"#;

/// Section titles the template asks for, in template order.
pub const TEMPLATE_SECTIONS: [&str; 5] =
    ["Summary", "Technical Skills", "Experience", "Projects", "Education"];

/// Category labels used inside the Technical Skills section.
pub const SKILL_CATEGORIES: [&str; 4] = ["Languages", "Frameworks", "Developer Tools", "Libraries"];
